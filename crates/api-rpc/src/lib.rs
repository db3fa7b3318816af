//! JSON-RPC API Layer
//!
//! Exposes a bound service over JSON-RPC 2.0. Each method is served under its
//! wire name; the signature document under the reserved signature name.

pub mod error;
pub mod server;
pub mod transport;

pub use server::{RpcServer, RpcServerConfig, RunningServer};
pub use transport::RpcTransport;
