// Central Error Types for the Binding Layer

use crate::application::validation::ValidationErrors;
use crate::domain::SchemaError;
use thiserror::Error;

/// Boxed error returned by business methods
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Registration-time error: the service cannot be served
#[derive(Error, Debug)]
pub enum BindError {
    #[error("service name is empty")]
    EmptyName,

    #[error("service {service} has no eligible methods")]
    NoEligibleMethods { service: String },

    #[error("methods {first} and {second} both map to wire name {wire_name}")]
    NameCollision {
        wire_name: String,
        first: String,
        second: String,
    },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to render signature: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("service {0} is already bound to a transport")]
    AlreadyBound(String),

    #[error("failed to add handler [{method}]: {source}")]
    Transport {
        method: String,
        #[source]
        source: TransportError,
    },
}

/// Request-time error: the outcome of one failed call
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("failed to decode {content_type} payload: {source}")]
    Decode {
        content_type: String,
        #[source]
        source: BoxError,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Invocation(#[source] BoxError),

    #[error("failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Error raised by a transport while installing handlers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("handler {0} is already registered")]
    Duplicate(String),

    #[error("transport rejected handler: {0}")]
    Rejected(String),
}

/// Error from routing a call through [`crate::port::LocalTransport`]
#[derive(Error, Debug)]
pub enum CallError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// Result type alias using BindError
pub type Result<T> = std::result::Result<T, BindError>;
