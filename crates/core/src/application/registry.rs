// Method Registry
//
// A service declares its candidate methods once; discovery checks each one
// against the eligibility contract and builds the immutable wire-name table.
// Parameter count, context type and error return are fixed by the
// `Methods` signatures, so only shape-level rules are checked here.

use super::dispatcher::{Invoke, TypedMethod, VoidMethod};
use super::validation::ValidationPlan;
use crate::config::{BindConfig, CollisionPolicy};
use crate::domain::{to_wire_name, CallContext, Describe, TypeRef, TypeShape};
use crate::error::{BindError, BoxError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// A service object whose methods can be served over RPC.
///
/// # Example
///
/// ```
/// use svcbind_core::application::registry::{Methods, Service};
/// use svcbind_core::domain::{CallContext, Describe, TypeShape};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Ping {
///     message: String,
/// }
///
/// impl Describe for Ping {
///     fn shape() -> TypeShape {
///         TypeShape::record::<Self>().field::<String>("message").build()
///     }
/// }
///
/// struct PingServer;
///
/// impl PingServer {
///     fn ping(&self, _ctx: &CallContext, input: &Ping, out: &mut Ping) -> Result<(), String> {
///         out.message = input.message.clone();
///         Ok(())
///     }
/// }
///
/// impl Service for PingServer {
///     fn methods(methods: &mut Methods<Self>) {
///         methods.method("Ping", Self::ping);
///     }
/// }
/// ```
pub trait Service: Send + Sync + Sized + 'static {
    /// Declare candidate methods under their declared (mixed-case) names
    fn methods(methods: &mut Methods<Self>);
}

/// Declared result of a method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// No structured output; success is the absence of an error
    Void,
    Typed(TypeRef),
}

pub(crate) struct Candidate {
    declared_name: String,
    argument: TypeRef,
    result: ResultKind,
    invoker: Arc<dyn Invoke>,
}

/// Collector handed to [`Service::methods`]
pub struct Methods<S> {
    service: Arc<S>,
    candidates: Vec<Candidate>,
}

impl<S: Send + Sync + 'static> Methods<S> {
    fn new(service: Arc<S>) -> Self {
        Self {
            service,
            candidates: Vec::new(),
        }
    }

    /// Method that fills a freshly defaulted result record
    pub fn method<A, R, E, F>(&mut self, name: &str, f: F) -> &mut Self
    where
        A: Describe + DeserializeOwned + Serialize,
        R: Describe + Default + Serialize,
        E: Into<BoxError>,
        F: Fn(&S, &CallContext, &A, &mut R) -> std::result::Result<(), E>
            + Send
            + Sync
            + 'static,
    {
        self.candidates.push(Candidate {
            declared_name: name.to_string(),
            argument: TypeRef::of::<A>(),
            result: ResultKind::Typed(TypeRef::of::<R>()),
            invoker: Arc::new(TypedMethod::new(self.service.clone(), f)),
        });
        self
    }

    /// Method without structured output
    pub fn void<A, E, F>(&mut self, name: &str, f: F) -> &mut Self
    where
        A: Describe + DeserializeOwned + Serialize,
        E: Into<BoxError>,
        F: Fn(&S, &CallContext, &A) -> std::result::Result<(), E> + Send + Sync + 'static,
    {
        self.candidates.push(Candidate {
            declared_name: name.to_string(),
            argument: TypeRef::of::<A>(),
            result: ResultKind::Void,
            invoker: Arc::new(VoidMethod::new(self.service.clone(), f)),
        });
        self
    }
}

/// Why a declared method was left out of the table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Ineligible {
    #[error("method name is not exported (must start with an uppercase letter)")]
    NotExported,

    #[error("argument type {0} is not a record")]
    ArgumentNotRecord(&'static str),

    #[error("result type {0} is not a record")]
    ResultNotRecord(&'static str),

    #[error("wire name {0} is reserved")]
    Reserved(String),
}

/// One registered method
pub struct MethodDescriptor {
    wire_name: String,
    declared_name: String,
    argument: TypeRef,
    result: ResultKind,
    validation: ValidationPlan,
    invoker: Arc<dyn Invoke>,
    calls: AtomicU64,
}

impl MethodDescriptor {
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    pub fn argument(&self) -> TypeRef {
        self.argument
    }

    pub fn result(&self) -> ResultKind {
        self.result
    }

    pub(crate) fn validation(&self) -> &ValidationPlan {
        &self.validation
    }

    pub(crate) fn invoker(&self) -> &dyn Invoke {
        self.invoker.as_ref()
    }

    /// Requests dispatched to this method so far (statistics only)
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub(crate) fn record_call(&self) -> u64 {
        self.calls.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("wire_name", &self.wire_name)
            .field("declared_name", &self.declared_name)
            .field("argument", &self.argument)
            .field("result", &self.result)
            .field("calls", &self.call_count())
            .finish()
    }
}

/// Immutable wire-name table of one service
#[derive(Debug)]
pub struct ServiceDescriptor {
    name: String,
    methods: BTreeMap<String, Arc<MethodDescriptor>>,
}

impl ServiceDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, wire_name: &str) -> Option<&Arc<MethodDescriptor>> {
        self.methods.get(wire_name)
    }

    /// Methods ordered by wire name
    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodDescriptor>> {
        self.methods.values()
    }

    pub fn wire_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Build the method table for `service`.
///
/// Ineligible methods are logged and skipped. Registration fails when the
/// name is empty, no method survives, a validation tag is malformed, or two
/// methods collide under [`CollisionPolicy::Reject`].
pub fn discover<S: Service>(
    name: &str,
    service: Arc<S>,
    config: &BindConfig,
) -> Result<ServiceDescriptor> {
    if name.trim().is_empty() {
        return Err(BindError::EmptyName);
    }

    let mut declared = Methods::new(service);
    S::methods(&mut declared);

    let mut methods: BTreeMap<String, Arc<MethodDescriptor>> = BTreeMap::new();
    for candidate in declared.candidates {
        let wire_name = to_wire_name(&candidate.declared_name);
        if let Err(reason) = check_eligibility(&candidate, &wire_name, config) {
            warn!(
                service = %name,
                method = %candidate.declared_name,
                reason = %reason,
                "Skipping ineligible method"
            );
            continue;
        }

        let validation = ValidationPlan::for_type(candidate.argument)?;
        let descriptor = Arc::new(MethodDescriptor {
            wire_name: wire_name.clone(),
            declared_name: candidate.declared_name,
            argument: candidate.argument,
            result: candidate.result,
            validation,
            invoker: candidate.invoker,
            calls: AtomicU64::new(0),
        });

        match methods.entry(wire_name) {
            Entry::Vacant(slot) => {
                debug!(
                    service = %name,
                    method = %descriptor.declared_name,
                    wire_name = %descriptor.wire_name,
                    "Registered method"
                );
                slot.insert(descriptor);
            }
            Entry::Occupied(mut slot) => {
                let first = slot.get().declared_name.clone();
                match config.collision_policy {
                    CollisionPolicy::Reject => {
                        return Err(BindError::NameCollision {
                            wire_name: slot.key().clone(),
                            first,
                            second: descriptor.declared_name.clone(),
                        });
                    }
                    CollisionPolicy::Overwrite => {
                        warn!(
                            service = %name,
                            wire_name = %slot.key(),
                            replaced = %first,
                            method = %descriptor.declared_name,
                            "Wire name collision, later method wins"
                        );
                        slot.insert(descriptor);
                    }
                }
            }
        }
    }

    if methods.is_empty() {
        error!(service = %name, "Service has no eligible methods");
        return Err(BindError::NoEligibleMethods {
            service: name.to_string(),
        });
    }

    Ok(ServiceDescriptor {
        name: name.to_string(),
        methods,
    })
}

fn check_eligibility(
    candidate: &Candidate,
    wire_name: &str,
    config: &BindConfig,
) -> std::result::Result<(), Ineligible> {
    let exported = candidate
        .declared_name
        .chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false);
    if !exported {
        return Err(Ineligible::NotExported);
    }

    if !is_record(candidate.argument) {
        return Err(Ineligible::ArgumentNotRecord(candidate.argument.name()));
    }

    if let ResultKind::Typed(result) = candidate.result {
        if !is_record(result) {
            return Err(Ineligible::ResultNotRecord(result.name()));
        }
    }

    if wire_name == config.signature_method {
        return Err(Ineligible::Reserved(wire_name.to_string()));
    }

    Ok(())
}

fn is_record(ty: TypeRef) -> bool {
    matches!(ty.resolve().1, TypeShape::Record(_))
}
