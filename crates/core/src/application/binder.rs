// Service Binder
//
// Registration entry point: discovers methods, renders the signature once,
// and installs one handler per method plus the signature handler on a
// transport.

use super::dispatcher::{method_handler, signature_handler};
use super::registry::{discover, Service, ServiceDescriptor};
use super::signature::Signature;
use crate::config::BindConfig;
use crate::error::{BindError, Result};
use crate::port::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// A registered service, ready to be bound to a transport
pub struct ServiceBinder {
    config: Arc<BindConfig>,
    descriptor: Arc<ServiceDescriptor>,
    signature: Signature,
    document: Arc<str>,
    bound: AtomicBool,
}

impl ServiceBinder {
    /// Register `service` under `name`.
    ///
    /// # Errors
    ///
    /// Fails when the service cannot be served at all: empty name, no
    /// eligible method, a wire-name collision under the reject policy, or a
    /// type that cannot be described in the signature.
    pub fn register<S: Service>(name: &str, service: S, config: BindConfig) -> Result<Self> {
        Self::register_shared(name, Arc::new(service), config)
    }

    /// Register a service that is also used elsewhere
    pub fn register_shared<S: Service>(
        name: &str,
        service: Arc<S>,
        config: BindConfig,
    ) -> Result<Self> {
        let descriptor = discover(name, service, &config)?;
        let signature = Signature::build(&descriptor)?;
        let document: Arc<str> = signature.render()?.into();

        info!(
            service = %descriptor.name(),
            methods = descriptor.len(),
            "Service method signature\n{}",
            document
        );

        Ok(Self {
            config: Arc::new(config),
            descriptor: Arc::new(descriptor),
            signature,
            document,
            bound: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Rendered signature document (YAML)
    pub fn signature_document(&self) -> &str {
        &self.document
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }

    /// Install every method handler and the signature handler.
    ///
    /// A service can be bound once.
    pub fn bind<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<()> {
        if self.bound.swap(true, Ordering::SeqCst) {
            return Err(BindError::AlreadyBound(self.name().to_string()));
        }

        info!(service = %self.name(), "Binding service to transport");

        for method in self.descriptor.methods() {
            info!(method = %method.wire_name(), "Adding method to transport");
            let handler = method_handler(method.clone(), self.config.clone());
            transport
                .add_handler(method.wire_name(), handler)
                .map_err(|source| BindError::Transport {
                    method: method.wire_name().to_string(),
                    source,
                })?;
        }

        let signature_method = self.config.signature_method.as_str();
        transport
            .add_handler(signature_method, signature_handler(self.document.clone()))
            .map_err(|source| BindError::Transport {
                method: signature_method.to_string(),
                source,
            })?;

        Ok(())
    }
}

impl std::fmt::Debug for ServiceBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBinder")
            .field("name", &self.name())
            .field("methods", &self.descriptor.wire_names())
            .field("bound", &self.is_bound())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::{JSON_CONTENT_TYPE, YAML_CONTENT_TYPE};
    use crate::application::fixtures::{CalendarServer, DemoServer};
    use crate::domain::{CallContext, SchemaError};
    use crate::error::{CallError, TransportError};
    use crate::port::transport::MockTransport;
    use crate::port::LocalTransport;

    fn demo_binder() -> ServiceBinder {
        ServiceBinder::register("demo/v1", DemoServer::default(), BindConfig::default()).unwrap()
    }

    #[test]
    fn test_register_renders_signature() {
        let binder = demo_binder();

        assert_eq!(binder.name(), "demo/v1");
        assert_eq!(binder.descriptor().len(), 4);
        assert_eq!(binder.signature().spec.len(), 4);
        assert!(binder
            .signature_document()
            .starts_with("apiVersion: demo/v1\n"));
        assert!(!binder.is_bound());
    }

    #[test]
    fn test_register_rejects_calendar_time() {
        let err = ServiceBinder::register("cal", CalendarServer, BindConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            BindError::Schema(SchemaError::CalendarTime { ref field, .. }) if field == "created"
        ));
    }

    #[test]
    fn test_bind_installs_every_handler() {
        let binder = demo_binder();
        let mut transport = MockTransport::new();

        for name in ["echo", "get_login_kind", "list_areas", "update_info", "get_signature"] {
            transport
                .expect_add_handler()
                .withf(move |n, _| n == name)
                .times(1)
                .returning(|_, _| Ok(()));
        }

        binder.bind(&mut transport).unwrap();
        assert!(binder.is_bound());
    }

    #[test]
    fn test_bind_twice_fails() {
        let binder = demo_binder();
        let mut transport = LocalTransport::new();

        binder.bind(&mut transport).unwrap();
        let err = binder.bind(&mut transport).unwrap_err();

        assert!(matches!(err, BindError::AlreadyBound(ref name) if name == "demo/v1"));
    }

    #[test]
    fn test_transport_failure_is_reported() {
        let binder = demo_binder();
        let mut transport = MockTransport::new();
        transport
            .expect_add_handler()
            .withf(|name, _| name == "echo")
            .returning(|_, _| Err(TransportError::Rejected("closed".to_string())));

        let err = binder.bind(&mut transport).unwrap_err();

        match err {
            BindError::Transport { method, source } => {
                assert_eq!(method, "echo");
                assert_eq!(source, TransportError::Rejected("closed".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bound_service_round_trip() {
        let binder = demo_binder();
        let mut transport = LocalTransport::new();
        binder.bind(&mut transport).unwrap();

        let ctx = CallContext::new();
        let content = transport
            .call("echo", &ctx, br#"{"message":"hello"}"#, JSON_CONTENT_TYPE)
            .unwrap()
            .unwrap();
        assert_eq!(content.data, br#"{"message":"hello"}"#.to_vec());

        let signature = transport
            .call("get_signature", &ctx, b"", "")
            .unwrap()
            .unwrap();
        assert_eq!(signature.content_type, YAML_CONTENT_TYPE);
        assert_eq!(signature.data, binder.signature_document().as_bytes().to_vec());

        let err = transport.call("Echo", &ctx, b"{}", JSON_CONTENT_TYPE).unwrap_err();
        assert!(matches!(err, CallError::UnknownMethod(ref name) if name == "Echo"));
        assert_eq!(binder.descriptor().get("echo").unwrap().call_count(), 1);
    }
}
