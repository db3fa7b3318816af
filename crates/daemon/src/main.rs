//! svcbind daemon - Main Entry Point
//!
//! Registers the demo service, serves it over JSON-RPC and waits for Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use svcbind_api_rpc::{RpcServer, RpcServerConfig};
use svcbind_core::{BindConfig, ServiceBinder};
use svcbind_daemon::{logging, service_name_from_env, telemetry, EchoService};
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let _log_guard = logging::init_logging()?;

    info!("svcbind daemon v{} starting...", VERSION);

    // 2. Load configuration
    let bind_config = BindConfig::from_env();
    let rpc_config = RpcServerConfig::from_env();
    let service_name = service_name_from_env();

    info!(
        service = %service_name,
        signature_method = %bind_config.signature_method,
        collision_policy = ?bind_config.collision_policy,
        "Registering service..."
    );

    // 3. Register the service (fails fast on an unusable service definition)
    let binder = ServiceBinder::register(&service_name, EchoService::new(), bind_config)?;

    // 4. Start JSON-RPC server
    let server = RpcServer::new(rpc_config, Arc::new(binder)).start().await?;

    info!(url = %server.url(), "System ready");
    info!("Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Graceful shutdown
    server
        .handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    server.handle.stopped().await;
    telemetry::shutdown();

    info!("Shutdown complete.");

    Ok(())
}
