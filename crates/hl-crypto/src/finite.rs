//! Pre-encoding pass that rejects floats JSON cannot represent.

use std::fmt;

use serde::ser::{self, Serialize};

/// Walk `value` through serde and fail on the first NaN or infinite float.
pub(crate) fn ensure_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), NonFinite> {
    value.serialize(&mut FiniteCheck)
}

#[derive(Debug)]
pub(crate) struct NonFinite(String);

impl fmt::Display for NonFinite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NonFinite {}

impl ser::Error for NonFinite {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

struct FiniteCheck;

impl FiniteCheck {
    fn float(value: f64) -> Result<(), NonFinite> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(NonFinite(format!("non-finite float {value} has no JSON encoding")))
        }
    }
}

impl ser::Serializer for &mut FiniteCheck {
    type Ok = ();
    type Error = NonFinite;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), NonFinite> {
        FiniteCheck::float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), NonFinite> {
        FiniteCheck::float(v)
    }

    fn serialize_char(self, _: char) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _: &'static str, value: &T) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_tuple_variant(self, _: &'static str, _: u32, _: &'static str, _: usize) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, NonFinite> {
        Ok(self)
    }

    fn serialize_struct_variant(self, _: &'static str, _: u32, _: &'static str, _: usize) -> Result<Self, NonFinite> {
        Ok(self)
    }
}

impl ser::SerializeSeq for &mut FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeTuple for &mut FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for &mut FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for &mut FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeMap for &mut FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), NonFinite> {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeStruct for &mut FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<(), NonFinite> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for &mut FiniteCheck {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<(), NonFinite> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn finite_values_pass() {
        assert!(ensure_finite(&(1u8, "x", 2.5f64, Some(-0.0f32))).is_ok());
        assert!(ensure_finite(&serde_json::json!({"a": [1, 2.5, null]})).is_ok());
    }

    #[test]
    fn nested_non_finite_is_found() {
        let mut inner = BTreeMap::new();
        inner.insert("deep", vec![0.0, f64::NEG_INFINITY]);
        let err = ensure_finite(&vec![inner]).unwrap_err();
        assert!(err.to_string().contains("-inf"));
    }
}
