//! RPC Error Types
//!
//! Maps invocation failures to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use serde_json::json;
use svcbind_core::error::{BindError, InvokeError};
use thiserror::Error;

/// RPC Error Codes
pub mod code {
    pub const DECODE_ERROR: i32 = 4000;
    pub const VALIDATION_ERROR: i32 = 4001;
    pub const INVOCATION_ERROR: i32 = 5000;
    pub const ENCODE_ERROR: i32 = 5001;
}

/// Convert InvokeError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: InvokeError) -> ErrorObjectOwned {
    match &err {
        InvokeError::Decode { .. } => {
            ErrorObjectOwned::owned(code::DECODE_ERROR, err.to_string(), None::<()>)
        }
        InvokeError::Validation(errors) => {
            let violations: Vec<_> = errors
                .violations()
                .iter()
                .map(|v| json!({"field": v.field, "rule": v.rule, "message": v.message}))
                .collect();
            ErrorObjectOwned::owned(
                code::VALIDATION_ERROR,
                err.to_string(),
                Some(json!({ "violations": violations })),
            )
        }
        InvokeError::Invocation(_) => {
            ErrorObjectOwned::owned(code::INVOCATION_ERROR, err.to_string(), None::<()>)
        }
        InvokeError::Encode(_) => {
            ErrorObjectOwned::owned(code::ENCODE_ERROR, err.to_string(), None::<()>)
        }
    }
}

/// Server startup error
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind service: {0}")]
    Bind(#[from] BindError),

    #[error("failed to listen on {addr}: {source}")]
    Listen {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
