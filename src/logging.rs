use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset. Request traces from tower-http stay at info.
pub const DEFAULT_FILTER: &str = "warn,readlog=info,readlog_app=info,tower_http=info";

/// Installs the stderr subscriber for both binaries.
pub fn init() -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER).context("build default log filter")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("install log subscriber: {err}"))?;

    tracing::debug!("logging initialized");
    Ok(())
}
