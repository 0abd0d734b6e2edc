// Configuration for footprint analysis runs
//
// Loaded from TOML; every field has a default so an empty file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for event-log import and footprint analysis
///
/// # Example
/// ```
/// use huella::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.rework_prefix, "UNA");
/// assert!(config.exclude_rework);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Operation id prefix marking unplanned rework records
    ///
    /// Rework is not part of the planned routing and would create spurious
    /// footprints, so matching rows are removed before any baseline is computed.
    pub rework_prefix: String,

    /// Remove rework records on import
    ///
    /// Default: true
    pub exclude_rework: bool,

    /// Field delimiter of the event-log CSV
    ///
    /// Default: `;` (MES export format)
    pub delimiter: char,

    /// `chrono` format string for date columns
    ///
    /// Default: `%d/%m/%Y %H:%M:%S`
    pub date_format: String,

    /// Minimum number of contracts required for an analysis
    ///
    /// Default: 1
    pub min_contracts: usize,

    /// Report only footprints outside the neutral band
    ///
    /// Default: false
    pub outliers_only: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rework_prefix: "UNA".to_string(),
            exclude_rework: true,
            delimiter: ';',
            date_format: "%d/%m/%Y %H:%M:%S".to_string(),
            min_contracts: 1,
            outliers_only: false,
        }
    }
}

impl AnalysisConfig {
    /// Require a handful of contracts before reporting spreads
    ///
    /// A spread over one or two footprints is rarely meaningful.
    pub fn strict() -> Self {
        Self {
            min_contracts: 5,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(content).context("Failed to parse TOML analysis configuration")?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid analysis configuration: {}", e))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.exclude_rework && self.rework_prefix.is_empty() {
            return Err("rework_prefix must not be empty when exclude_rework is set".to_string());
        }

        if self.delimiter == '"' || self.delimiter == '\n' {
            return Err(format!("delimiter {:?} is not allowed", self.delimiter));
        }

        if self.date_format.trim().is_empty() {
            return Err("date_format must not be empty".to_string());
        }

        if self.min_contracts == 0 {
            return Err("min_contracts must be >= 1".to_string());
        }

        Ok(())
    }
}
