//! Configuration management for finvista
//!
//! This module handles loading, validation, and management of
//! finvista configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Statement ingestion limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum statement file size in bytes
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    5 * 1024 * 1024
}

/// Display windows and truncation thresholds for the aggregate reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Months shown in the balance evolution series
    #[serde(default = "default_balance_months")]
    pub balance_months: usize,
    /// Months shown in the income/expense/savings series
    #[serde(default = "default_flow_months")]
    pub flow_months: usize,
    /// Months shown in the per-category trend series
    #[serde(default = "default_trend_months")]
    pub trend_months: usize,
    /// Categories plotted by default in the trend series
    #[serde(default = "default_trend_categories")]
    pub trend_categories: usize,
    /// Categories shown in the top-categories ranking
    #[serde(default = "default_top_categories")]
    pub top_categories: usize,
    /// Slices shown in the category distribution
    #[serde(default = "default_distribution_slices")]
    pub distribution_slices: usize,
    /// Categories shown in the subcategory breakdown
    #[serde(default = "default_breakdown_slices")]
    pub breakdown_slices: usize,
    /// Categories compared by default in the per-year breakdown
    #[serde(default = "default_year_categories")]
    pub year_categories: usize,
    /// Calendar years covered by the daily expense series
    #[serde(default = "default_heatmap_years")]
    pub heatmap_years: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            balance_months: default_balance_months(),
            flow_months: default_flow_months(),
            trend_months: default_trend_months(),
            trend_categories: default_trend_categories(),
            top_categories: default_top_categories(),
            distribution_slices: default_distribution_slices(),
            breakdown_slices: default_breakdown_slices(),
            year_categories: default_year_categories(),
            heatmap_years: default_heatmap_years(),
        }
    }
}

fn default_balance_months() -> usize {
    50
}

fn default_flow_months() -> usize {
    36
}

fn default_trend_months() -> usize {
    36
}

fn default_trend_categories() -> usize {
    5
}

fn default_top_categories() -> usize {
    10
}

fn default_distribution_slices() -> usize {
    8
}

fn default_breakdown_slices() -> usize {
    8
}

fn default_year_categories() -> usize {
    6
}

fn default_heatmap_years() -> i32 {
    3
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Ingestion limits
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Report display settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;

        let config: Config =
            serde_yaml::from_str(&content).map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.max_file_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.max_file_bytes".to_string(),
                reason: "File size limit must be greater than 0".to_string(),
            });
        }

        if self.display.balance_months == 0 || self.display.flow_months == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display".to_string(),
                reason: "Month windows must be greater than 0".to_string(),
            });
        }

        if self.display.heatmap_years < 1 {
            return Err(ConfigError::InvalidValue {
                field: "display.heatmap_years".to_string(),
                reason: "Heatmap window must cover at least 1 year".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}
