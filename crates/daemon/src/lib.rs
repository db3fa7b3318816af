//! svcbind daemon library: demo service and process setup shared with tests

pub mod echo;
pub mod logging;
pub mod telemetry;

pub use echo::EchoService;

/// Service name used when `SVCBIND_SERVICE_NAME` is not set
pub const DEFAULT_SERVICE_NAME: &str = "demo.echo/v1";

/// Service name from the environment
pub fn service_name_from_env() -> String {
    std::env::var("SVCBIND_SERVICE_NAME")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string())
}
