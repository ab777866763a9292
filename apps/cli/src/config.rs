//! Configuration loading: JSON file first, then environment overrides.

use std::path::Path;

use anyhow::{anyhow, Context};
use sideline_acquisition::{AcquisitionConfig, ValidationMode};

/// Credentials for the bundled weather adapters.
#[derive(Debug, Default, Clone)]
pub struct ApiKeys {
    pub accuweather: Option<String>,
    pub openweather: Option<String>,
}

impl ApiKeys {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let key = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            accuweather: key("ACCUWEATHER_API_KEY"),
            openweather: key("OPENWEATHER_API_KEY"),
        }
    }
}

/// Read the configuration file, if any, and apply environment overrides.
pub fn load(path: Option<&Path>) -> anyhow::Result<AcquisitionConfig> {
    load_with(path, |name| std::env::var(name).ok())
}

/// [`load`] with overrides read through `lookup`.
pub fn load_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<AcquisitionConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => AcquisitionConfig::default(),
    };

    apply_overrides(config, lookup)
}

/// Apply `SIDELINE_*` overrides read through `lookup`.
pub fn apply_overrides(
    mut config: AcquisitionConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<AcquisitionConfig> {
    if let Some(value) = lookup("SIDELINE_MAX_RETRIES") {
        config.max_retries = value
            .trim()
            .parse()
            .with_context(|| format!("SIDELINE_MAX_RETRIES={}", value))?;
    }

    if let Some(value) = lookup("SIDELINE_FETCH_TIMEOUT_SECS") {
        config.fetch_timeout = value
            .trim()
            .parse()
            .with_context(|| format!("SIDELINE_FETCH_TIMEOUT_SECS={}", value))?;
    }

    if let Some(value) = lookup("SIDELINE_VALIDATION_MODE") {
        config.validation_mode = value
            .parse::<ValidationMode>()
            .map_err(|e| anyhow!("SIDELINE_VALIDATION_MODE: {}", e))?;
    }

    config.validate()?;
    Ok(config)
}
