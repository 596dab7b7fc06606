use anyhow::Context;
use nd_config::{DEFAULT_CONFIG_PATH, NightdumpConfig};

use crate::cli::GlobalFlags;

/// Load and validate configuration. Fails before any subprocess runs.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<NightdumpConfig> {
    let config = NightdumpConfig::load_with_dotenv(flags.config.as_deref()).with_context(|| {
        format!(
            "failed to load configuration from {}",
            flags
                .config
                .as_deref()
                .map_or_else(|| DEFAULT_CONFIG_PATH.to_string(), |p| p.display().to_string())
        )
    })?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}
