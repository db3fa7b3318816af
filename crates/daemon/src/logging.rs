//! Logging setup
//!
//! stdout in pretty or JSON format, optional daily log files and optional
//! OpenTelemetry export, all filtered by `RUST_LOG`.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "svcbind=info";
const LOG_FILE_PREFIX: &str = "svcbind.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `SVCBIND_LOG_FORMAT=json` selects JSON; anything else is pretty
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("SVCBIND_LOG_FORMAT").unwrap_or_default())
    }

    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Directory for rolling log files from `SVCBIND_LOG_DIR`, tilde-expanded
pub fn log_dir_from_env() -> Option<String> {
    std::env::var("SVCBIND_LOG_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(|dir| shellexpand::tilde(&dir).into_owned())
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process so buffered
/// file output is flushed.
pub fn init_logging() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let stdout_layer = match LogFormat::from_env() {
        // Production: JSON structured logging
        LogFormat::Json => fmt::layer().json().boxed(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    };

    let (file_layer, guard) = match log_dir_from_env() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    #[cfg(feature = "telemetry")]
    let otel_layer = crate::telemetry::otel_layer()?;
    #[cfg(not(feature = "telemetry"))]
    let otel_layer: Option<tracing_subscriber::layer::Identity> = None;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .with(otel_layer)
        .try_init()?;

    crate::telemetry::log_status();
    Ok(guard)
}
