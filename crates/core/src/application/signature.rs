// Signature Document
//
// Machine-readable description of every method of a service, served under the
// reserved signature wire name.

use super::registry::{ResultKind, ServiceDescriptor};
use super::schema::extract;
use crate::domain::error::Result;
use crate::domain::FieldDescriptor;
use serde::Serialize;

/// Inputs and outputs of one method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    #[serde(rename = "in")]
    pub input: Vec<FieldDescriptor>,
    #[serde(rename = "out")]
    pub output: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    /// Service name
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    /// One entry per method, ordered by wire name
    pub spec: Vec<MethodSignature>,
}

impl Signature {
    /// Describe every method of `service`. Void methods get an empty output.
    pub fn build(service: &ServiceDescriptor) -> Result<Self> {
        let mut spec = Vec::with_capacity(service.len());
        for method in service.methods() {
            let output = match method.result() {
                ResultKind::Void => Vec::new(),
                ResultKind::Typed(result) => extract(result)?,
            };
            spec.push(MethodSignature {
                name: method.wire_name().to_string(),
                input: extract(method.argument())?,
                output,
            });
        }

        Ok(Self {
            api_version: service.name().to_string(),
            spec,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.spec.iter().find(|m| m.name == name)
    }

    /// Render as YAML, keeping field order
    pub fn render(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
