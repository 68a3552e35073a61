use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Wall-clock capture of a block's creation time.
///
/// Held at microsecond precision in UTC and rendered as
/// `YYYY-MM-DD HH:MM:SS.ffffff`. The rendered form is what gets committed
/// into a block digest, so a timestamp always survives a text round trip
/// unchanged.
///
/// Ordering is chronological.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S%.6f";

    /// Capture the current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(6))
    }

    /// Build a timestamp from microseconds since the UNIX epoch.
    pub fn from_unix_micros(micros: i64) -> Result<Self, TypeError> {
        let secs = micros.div_euclid(1_000_000);
        let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
        DateTime::from_timestamp(secs, nanos)
            .map(Self)
            .ok_or_else(|| TypeError::InvalidTimestamp {
                value: micros.to_string(),
                reason: "out of range".into(),
            })
    }

    /// Microseconds since the UNIX epoch.
    pub fn unix_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    /// The underlying UTC instant.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Capture the current time, never earlier than `floor`.
    ///
    /// Keeps timestamps non-decreasing along a ledger when the wall clock
    /// steps backwards between two captures.
    pub fn now_not_before(floor: &Self) -> Self {
        Self::now().max(*floor)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({self})")
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, Self::FORMAT)
            .map(|naive| Self(naive.and_utc().trunc_subsecs(6)))
            .map_err(|e| TypeError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
