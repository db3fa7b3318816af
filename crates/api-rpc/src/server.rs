//! JSON-RPC Server
//!
//! Serves one bound service over JSON-RPC 2.0 (HTTP and WebSocket on TCP).

use crate::error::ServerError;
use crate::transport::RpcTransport;
use jsonrpsee::server::{Server, ServerHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use svcbind_core::ServiceBinder;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 2000;

/// RPC Server Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks an ephemeral port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

impl RpcServerConfig {
    /// Load from environment
    ///
    /// # Environment Variables
    ///
    /// - `SVCBIND_RPC_HOST`: listen address (default: 127.0.0.1)
    /// - `SVCBIND_RPC_PORT`: listen port (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("SVCBIND_RPC_HOST")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = std::env::var("SVCBIND_RPC_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        Self { host, port }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Running server
pub struct RunningServer {
    pub handle: ServerHandle,
    pub local_addr: SocketAddr,
}

impl RunningServer {
    /// HTTP endpoint for clients
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    binder: Arc<ServiceBinder>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, binder: Arc<ServiceBinder>) -> Self {
        Self { config, binder }
    }

    /// Bind the service and start accepting requests
    pub async fn start(self) -> Result<RunningServer, ServerError> {
        let mut transport = RpcTransport::new();
        self.binder.bind(&mut transport)?;

        let addr = self.config.addr();
        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| ServerError::Listen {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server
            .local_addr()
            .map_err(|source| ServerError::Listen { addr, source })?;

        info!(
            service = %self.binder.name(),
            addr = %local_addr,
            methods = transport.names().len(),
            "JSON-RPC server started"
        );

        let handle = server.start(transport.into_module());
        Ok(RunningServer { handle, local_addr })
    }
}
