// Schema Error Types
//
// Raised while describing a service at registration time. Any of these stops
// registration: they are configuration bugs, not request failures.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{0} is not a record type")]
    NotARecord(String),

    #[error("field {field:?} of {record} uses a calendar time type; use JsonTime")]
    CalendarTime { record: String, field: String },

    #[error("map field {field:?} of {record} must be keyed by string")]
    NonStringMapKey { record: String, field: String },

    #[error("invalid validation rule {rule:?} on field {field:?}: {reason}")]
    InvalidRule {
        field: String,
        rule: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
