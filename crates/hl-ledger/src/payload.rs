use serde::Serialize;

/// Payload carried by every new ledger's genesis block.
pub const GENESIS_PAYLOAD: &str = "Genesis Block";

/// Application data a block can carry.
///
/// Anything canonically serializable qualifies; implementors also name the
/// sentinel value placed in the genesis block.
pub trait Payload: Serialize + Clone {
    fn genesis() -> Self;
}

impl Payload for String {
    fn genesis() -> Self {
        GENESIS_PAYLOAD.to_string()
    }
}

impl Payload for serde_json::Value {
    fn genesis() -> Self {
        serde_json::Value::String(GENESIS_PAYLOAD.to_string())
    }
}
