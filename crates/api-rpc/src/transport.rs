//! JSON-RPC Transport
//!
//! Installs core invocation handlers as blocking jsonrpsee methods.

use crate::error::to_rpc_error;
use jsonrpsee::types::{ErrorObjectOwned, Params};
use jsonrpsee::RpcModule;
use serde_json::Value;
use svcbind_core::application::JSON_CONTENT_TYPE;
use svcbind_core::error::TransportError;
use svcbind_core::port::{Content, InvocationHandler, Transport};
use svcbind_core::CallContext;
use tracing::debug;

/// Invalid params (JSON-RPC 2.0)
const INVALID_PARAMS: i32 = -32602;

/// Collects handlers into an [`RpcModule`]
pub struct RpcTransport {
    module: RpcModule<()>,
    names: Vec<String>,
}

impl RpcTransport {
    pub fn new() -> Self {
        Self {
            module: RpcModule::new(()),
            names: Vec::new(),
        }
    }

    /// Installed method names, in installation order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_module(self) -> RpcModule<()> {
        self.module
    }
}

impl Default for RpcTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for RpcTransport {
    fn add_handler(&mut self, name: &str, handler: InvocationHandler) -> Result<(), TransportError> {
        if self.module.method(name).is_some() {
            return Err(TransportError::Duplicate(name.to_string()));
        }

        // jsonrpsee keys methods by &'static str. One leak per installed name, and a
        // binder installs each name once, so the leak is bounded by the method table.
        let method_name: &'static str = Box::leak(name.to_string().into_boxed_str());
        self.module
            .register_blocking_method(method_name, move |params, _, _| {
                let body = request_body(&params)?;
                let ctx = CallContext::new();
                debug!(method = method_name, request_id = %ctx.request_id(), "rpc call");

                match handler(&ctx, &body, JSON_CONTENT_TYPE) {
                    Ok(Some(content)) => response_value(content),
                    Ok(None) => Ok(Value::Null),
                    Err(e) => Err(to_rpc_error(e)),
                }
            })
            .map_err(|e| TransportError::Rejected(e.to_string()))?;

        self.names.push(name.to_string());
        Ok(())
    }
}

/// Turn JSON-RPC params into a request body.
///
/// `[arg]` is unwrapped to `arg`; missing params become `{}`.
fn request_body(params: &Params) -> Result<Vec<u8>, ErrorObjectOwned> {
    let value: Value = params.parse()?;
    let value = match value {
        Value::Null => Value::Object(Default::default()),
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    };
    serde_json::to_vec(&value)
        .map_err(|e| ErrorObjectOwned::owned(INVALID_PARAMS, e.to_string(), None::<()>))
}

/// JSON bodies are returned as-is; anything else (the YAML signature) as a string
fn response_value(content: Content) -> Result<Value, ErrorObjectOwned> {
    if content.content_type == JSON_CONTENT_TYPE {
        serde_json::from_slice(&content.data).map_err(|e| {
            ErrorObjectOwned::owned(crate::error::code::ENCODE_ERROR, e.to_string(), None::<()>)
        })
    } else {
        Ok(Value::String(
            String::from_utf8_lossy(&content.data).into_owned(),
        ))
    }
}
