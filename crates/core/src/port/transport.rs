// Transport Port
//
// The wire transport (HTTP/gRPC/JSON-RPC) lives outside the core. It accepts
// named handlers and feeds them raw request bytes plus a content type.

use crate::domain::CallContext;
use crate::error::{CallError, InvokeError, TransportError};
use std::collections::HashMap;
use std::sync::Arc;

/// Encoded response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl Content {
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }
}

/// Request handler installed on a transport.
///
/// `Ok(None)` is a successful call with no response body.
pub type InvocationHandler = Arc<
    dyn Fn(&CallContext, &[u8], &str) -> Result<Option<Content>, InvokeError> + Send + Sync,
>;

/// Transport interface (allows mocking in tests)
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Install a handler under its wire name
    fn add_handler(&mut self, name: &str, handler: InvocationHandler) -> Result<(), TransportError>;
}

/// In-process transport: routes calls by wire name without any network
#[derive(Default, Clone)]
pub struct LocalTransport {
    handlers: HashMap<String, InvocationHandler>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Installed wire names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Route one call. Unknown names never reach a handler.
    pub fn call(
        &self,
        name: &str,
        ctx: &CallContext,
        data: &[u8],
        content_type: &str,
    ) -> Result<Option<Content>, CallError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| CallError::UnknownMethod(name.to_string()))?;
        Ok(handler(ctx, data, content_type)?)
    }
}

impl Transport for LocalTransport {
    fn add_handler(
        &mut self,
        name: &str,
        handler: InvocationHandler,
    ) -> Result<(), TransportError> {
        if self.handlers.contains_key(name) {
            return Err(TransportError::Duplicate(name.to_string()));
        }
        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }
}
