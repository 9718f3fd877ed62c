//! CLI configuration file.
//!
//! ```toml
//! [ledger]
//! max_processes = 16
//! strict_allocation = true
//!
//! [report]
//! label_prefix = "T"
//! include_trace = true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bastion_core::LedgerConfig;
use bastion_observe::ReportConfig;

/// Settings read from `--config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ledger limits and admission policy.
    pub ledger: LedgerConfig,
    /// Report rendering.
    pub report: ReportConfig,
}

impl CliConfig {
    /// Load the configuration file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let input = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&input)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        tracing::debug!(path = %path.display(), ?config, "Loaded configuration");
        Ok(config)
    }

    fn parse(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}
