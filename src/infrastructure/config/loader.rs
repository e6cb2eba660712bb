use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

use crate::domain::error::ConfigError;
use crate::domain::models::HarnessConfig;

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. sweepcheck.yaml (project config)
    /// 3. sweepcheck.local.yaml (local overrides, optional)
    /// 4. Environment variables (SWEEPCHECK_* prefix, highest priority)
    pub fn load() -> Result<HarnessConfig> {
        let config: HarnessConfig = Figment::new()
            .merge(Serialized::defaults(HarnessConfig::default()))
            .merge(Yaml::file("sweepcheck.yaml"))
            .merge(Yaml::file("sweepcheck.local.yaml"))
            .merge(Env::prefixed("SWEEPCHECK_").split("__"))
            .extract()
            .context("failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<HarnessConfig> {
        let config: HarnessConfig = Figment::new()
            .merge(Serialized::defaults(HarnessConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading. The sweep must not start
    /// with a config that can only fail later.
    pub fn validate(config: &HarnessConfig) -> Result<(), ConfigError> {
        if config.run.command.trim().is_empty() {
            return Err(ConfigError::EmptyRunCommand);
        }

        if config.analyze.scan_last_lines == 0 {
            return Err(ConfigError::InvalidScanWindow);
        }

        if let Some(conv) = &config.analyze.convergence {
            if conv.tolerance < 0.0 {
                return Err(ConfigError::InvalidTolerance(conv.tolerance));
            }
        }

        Ok(())
    }
}
