use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TelemetryConfig;

/// Install the global subscriber; `RUST_LOG` wins over the configured filter
pub fn init_tracing(cfg: &TelemetryConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cfg.filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(cfg.json.then(|| fmt::layer().json()))
        .with((!cfg.json).then(fmt::layer))
        .try_init()?;
    Ok(())
}
