// Invocation Dispatcher
//
// Turns a registered method into a transport handler:
// decode -> validate -> prepare result -> invoke -> count -> log -> encode.

use super::registry::MethodDescriptor;
use super::validation::ValidationPlan;
use crate::config::BindConfig;
use crate::domain::CallContext;
use crate::error::{BoxError, InvokeError};
use crate::port::{Content, InvocationHandler};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const YAML_CONTENT_TYPE: &str = "application/yaml";

/// Request body codec, picked from the request content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Json,
    Yaml,
}

impl Codec {
    /// YAML media types select YAML; everything else is treated as JSON
    pub fn for_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/yaml" | "application/x-yaml" | "text/yaml" | "text/x-yaml" => Codec::Yaml,
            _ => Codec::Json,
        }
    }

    pub fn decode<A: DeserializeOwned>(self, data: &[u8]) -> Result<A, BoxError> {
        match self {
            Codec::Json => serde_json::from_slice(data).map_err(Into::into),
            Codec::Yaml => serde_yaml::from_slice(data).map_err(Into::into),
        }
    }
}

/// Type-erased entry point of one method
pub(crate) trait Invoke: Send + Sync {
    fn invoke(
        &self,
        ctx: &CallContext,
        data: &[u8],
        content_type: &str,
        plan: &ValidationPlan,
    ) -> Result<Option<Content>, InvokeError>;
}

pub(crate) struct TypedMethod<S, A, R, F> {
    service: Arc<S>,
    func: F,
    _types: PhantomData<fn(A) -> R>,
}

impl<S, A, R, F> TypedMethod<S, A, R, F> {
    pub(crate) fn new(service: Arc<S>, func: F) -> Self {
        Self {
            service,
            func,
            _types: PhantomData,
        }
    }
}

impl<S, A, R, E, F> Invoke for TypedMethod<S, A, R, F>
where
    S: Send + Sync,
    A: DeserializeOwned + Serialize,
    R: Default + Serialize,
    E: Into<BoxError>,
    F: Fn(&S, &CallContext, &A, &mut R) -> Result<(), E> + Send + Sync,
{
    fn invoke(
        &self,
        ctx: &CallContext,
        data: &[u8],
        content_type: &str,
        plan: &ValidationPlan,
    ) -> Result<Option<Content>, InvokeError> {
        let argument: A = decode_argument(data, content_type, plan)?;

        let mut result = R::default();
        (self.func)(&self.service, ctx, &argument, &mut result)
            .map_err(|e| InvokeError::Invocation(e.into()))?;

        let body = serde_json::to_vec(&result).map_err(InvokeError::Encode)?;
        Ok(Some(Content::new(body, JSON_CONTENT_TYPE)))
    }
}

pub(crate) struct VoidMethod<S, A, F> {
    service: Arc<S>,
    func: F,
    _types: PhantomData<fn(A)>,
}

impl<S, A, F> VoidMethod<S, A, F> {
    pub(crate) fn new(service: Arc<S>, func: F) -> Self {
        Self {
            service,
            func,
            _types: PhantomData,
        }
    }
}

impl<S, A, E, F> Invoke for VoidMethod<S, A, F>
where
    S: Send + Sync,
    A: DeserializeOwned + Serialize,
    E: Into<BoxError>,
    F: Fn(&S, &CallContext, &A) -> Result<(), E> + Send + Sync,
{
    fn invoke(
        &self,
        ctx: &CallContext,
        data: &[u8],
        content_type: &str,
        plan: &ValidationPlan,
    ) -> Result<Option<Content>, InvokeError> {
        let argument: A = decode_argument(data, content_type, plan)?;

        (self.func)(&self.service, ctx, &argument).map_err(|e| InvokeError::Invocation(e.into()))?;
        Ok(None)
    }
}

fn decode_argument<A>(data: &[u8], content_type: &str, plan: &ValidationPlan) -> Result<A, InvokeError>
where
    A: DeserializeOwned + Serialize,
{
    let argument: A =
        Codec::for_content_type(content_type)
            .decode(data)
            .map_err(|source| InvokeError::Decode {
                content_type: content_type.to_string(),
                source,
            })?;

    if !plan.is_empty() {
        // rules are checked against the decoded value, not the raw body
        let value = serde_json::to_value(&argument).map_err(|e| InvokeError::Decode {
            content_type: content_type.to_string(),
            source: e.into(),
        })?;
        plan.validate(&value)?;
    }

    Ok(argument)
}

/// Build the transport handler of one registered method.
///
/// Every dispatched request bumps the method's call counter and is logged,
/// whatever the outcome. A panicking method is reported as an invocation error.
pub fn method_handler(method: Arc<MethodDescriptor>, config: Arc<BindConfig>) -> InvocationHandler {
    Arc::new(move |ctx: &CallContext, data: &[u8], content_type: &str| {
        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            method
                .invoker()
                .invoke(ctx, data, content_type, method.validation())
        }))
        .unwrap_or_else(|payload| {
            Err(InvokeError::Invocation(
                format!("method panicked: {}", panic_message(payload.as_ref())).into(),
            ))
        });
        let calls = method.record_call();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let input = if config.log_payloads {
            String::from_utf8_lossy(data).into_owned()
        } else {
            format!("<{} bytes>", data.len())
        };

        match &outcome {
            Ok(_) => info!(
                method = %method.wire_name(),
                request_id = %ctx.request_id(),
                content_type = %content_type,
                input = %input,
                calls,
                elapsed_ms,
                "exec"
            ),
            Err(e) => warn!(
                method = %method.wire_name(),
                request_id = %ctx.request_id(),
                content_type = %content_type,
                input = %input,
                calls,
                elapsed_ms,
                error = %e,
                "exec failed"
            ),
        }

        outcome
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handler serving a pre-rendered signature document
pub fn signature_handler(document: Arc<str>) -> InvocationHandler {
    Arc::new(move |_ctx: &CallContext, _data: &[u8], _content_type: &str| {
        Ok(Some(Content::new(
            document.as_bytes().to_vec(),
            YAML_CONTENT_TYPE,
        )))
    })
}
