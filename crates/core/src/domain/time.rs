// Wrapped Time Type
//
// Timestamps cross the wire as "YYYY-MM-DD HH:MM:SS" in local time.
// General calendar types are rejected by the schema extractor; request and
// result records use JsonTime instead.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire pattern for [`JsonTime`]
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("invalid time {input:?}: expected YYYY-MM-DD HH:MM:SS")]
    Format { input: String },

    #[error("local time {input:?} does not exist in this timezone")]
    Nonexistent { input: String },
}

/// Local timestamp with second precision and a fixed text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonTime(DateTime<Local>);

impl JsonTime {
    pub fn new(time: DateTime<Local>) -> Self {
        Self(time)
    }

    pub fn now() -> Self {
        Self(Local::now())
    }

    pub fn as_datetime(&self) -> &DateTime<Local> {
        &self.0
    }

    pub fn into_inner(self) -> DateTime<Local> {
        self.0
    }

    /// Parse the wire pattern, interpreting it in the local timezone.
    ///
    /// Ambiguous local times (clock set back) resolve to the earliest instant.
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let naive = NaiveDateTime::parse_from_str(input, TIME_FORMAT).map_err(|_| {
            TimeParseError::Format {
                input: input.to_string(),
            }
        })?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(Self)
            .ok_or_else(|| TimeParseError::Nonexistent {
                input: input.to_string(),
            })
    }
}

impl Default for JsonTime {
    /// Unix epoch
    fn default() -> Self {
        Self(DateTime::<Utc>::default().with_timezone(&Local))
    }
}

impl From<DateTime<Local>> for JsonTime {
    fn from(time: DateTime<Local>) -> Self {
        Self(time)
    }
}

impl From<JsonTime> for DateTime<Local> {
    fn from(time: JsonTime) -> Self {
        time.0
    }
}

impl fmt::Display for JsonTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for JsonTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for JsonTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
