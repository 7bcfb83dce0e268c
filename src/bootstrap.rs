use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::constants::env::LOG_FORMAT;
use crate::{api::serve_api, Environment, RangeResolver, ServiceConfig};

/// Main entry point for the application.
///
/// Loads `.env`, reads the configuration, installs logging and serves until the
/// listener fails. Configuration errors are returned after logging is installed,
/// so the caller can report them through `tracing`.
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ServiceConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map(|config| config.environment)
            .unwrap_or_default(),
    );

    run_with_config(config?).await
}

/// Starts the service from an already loaded configuration.
pub async fn run_with_config(config: ServiceConfig) -> anyhow::Result<()> {
    info!(
        environment = %config.environment,
        port = config.port,
        "Starting fibcache"
    );

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;

    // Build the term store and share one resolver across requests
    let store = config.build_store()?;
    let resolver = RangeResolver::new(store);

    serve_api(listener, resolver).await?;

    Ok(())
}

/// Installs the global subscriber; `RUST_LOG` wins over the environment default.
///
/// A subscriber that is already installed is left in place.
pub fn init_tracing(environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if json_logs(dotenvy::var(LOG_FORMAT).ok().as_deref()) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.ok();
}

fn json_logs(format: Option<&str>) -> bool {
    format.is_some_and(|format| format.trim().eq_ignore_ascii_case("json"))
}
