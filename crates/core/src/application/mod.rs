// Application Layer - Discovery, Dispatch and Signatures

pub mod binder;
pub mod dispatcher;
pub mod registry;
pub mod schema;
pub mod signature;
pub mod validation;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod registry_test;

// Re-exports
pub use binder::ServiceBinder;
pub use dispatcher::{Codec, JSON_CONTENT_TYPE, YAML_CONTENT_TYPE};
pub use registry::{Methods, MethodDescriptor, ResultKind, Service, ServiceDescriptor};
pub use signature::{MethodSignature, Signature};
pub use validation::{ValidationErrors, ValidationPlan, Violation};
