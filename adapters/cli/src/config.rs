use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Log filter used when neither `RUST_LOG` nor the config sets one.
pub(crate) const DEFAULT_LOG_FILTER: &str = "info";

/// Settings read from the optional TOML config file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// `tracing` filter directive.
    pub(crate) log_filter: Option<String>,
    /// Simulation step length in milliseconds.
    pub(crate) fixed_step_ms: u64,
    /// Level simulated when `--level` is not given.
    pub(crate) default_level: Option<PathBuf>,
    /// Number of steps simulated when `--steps` is not given.
    pub(crate) steps: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_filter: None,
            fixed_step_ms: 16,
            default_level: None,
            steps: 600,
        }
    }
}

impl CliConfig {
    /// Reads the config file, or returns defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid config toml")?;
        anyhow::ensure!(config.fixed_step_ms > 0, "fixed_step_ms must be positive");
        Ok(config)
    }

    /// Filter directive to install when `RUST_LOG` is unset.
    pub(crate) fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
