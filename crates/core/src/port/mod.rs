// Port Layer - Interfaces for external collaborators

pub mod transport;

// Re-exports
pub use transport::{Content, InvocationHandler, LocalTransport, Transport};
