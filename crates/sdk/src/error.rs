//! SDK Error Types

use jsonrpsee::core::ClientError;
use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid endpoint {url}: {reason}")]
    Endpoint { url: String, reason: String },

    /// The server answered with a JSON-RPC error object
    #[error("call failed ({code}): {message}")]
    Rpc { code: i32, message: String },

    /// The request never produced an answer (refused, timed out, closed)
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("payload is not valid JSON for this call: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("invalid signature document: {0}")]
    Signature(#[from] serde_yaml::Error),
}

impl SdkError {
    /// JSON-RPC error code, if the server answered with one
    pub fn code(&self) -> Option<i32> {
        match self {
            SdkError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<ClientError> for SdkError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Call(call) => SdkError::Rpc {
                code: call.code(),
                message: call.message().to_string(),
            },
            ClientError::ParseError(e) => SdkError::Payload(e),
            other => SdkError::Transport(other.to_string()),
        }
    }
}
