use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_LOG_LEVEL: &str =
    "info,mat_allocation_engine=debug,mat_allocation_database=debug,tokio_postgres=info";

/// Picks the filter directives: `RUST_LOG` wins over the configured filter,
/// which wins over [`DEFAULT_LOG_LEVEL`].
#[must_use]
pub fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        configured
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
    })
}

/// Installs the global subscriber. Calling it twice is harmless, the second
/// call keeps the first subscriber.
pub fn setup_telemetry(configured: Option<&str>) {
    // will also redirect log events to trace events
    let stdout_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = tracing_subscriber::registry()
        .with(stdout_log.with_filter(env_filter(configured)))
        .try_init();

    if result.is_ok() {
        debug!("telemetry initialized");
    }
}
