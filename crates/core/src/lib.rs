// Svcbind Core - Service Discovery, Signatures & Dispatch
// NO transport dependencies: wire adapters implement `port::Transport`

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{Methods, Service, ServiceBinder};
pub use config::{BindConfig, CollisionPolicy};
pub use domain::{CallContext, Describe, JsonTime, TypeShape};
pub use error::{BindError, BoxError, InvokeError, Result};
pub use port::{Content, LocalTransport, Transport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
