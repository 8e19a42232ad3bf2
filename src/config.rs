//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.journeylens.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".journeylens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Record source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Normalization thresholds.
    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Location scope: "all" or a location id.
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            scope: default_scope(),
        }
    }
}

fn default_output() -> String {
    "journey_report.md".to_string()
}

fn default_scope() -> String {
    "all".to_string()
}

/// Where the journey records come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the JSON collections.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Base URL of the entities API. Takes precedence over `data_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Bearer token for the entities API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_locations_order")]
    pub locations_order: String,

    #[serde(default = "default_date_order")]
    pub environmental_order: String,

    #[serde(default = "default_date_order")]
    pub biological_order: String,

    #[serde(default = "default_journal_order")]
    pub journal_order: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_url: None,
            api_key: None,
            timeout_seconds: default_timeout(),
            locations_order: default_locations_order(),
            environmental_order: default_date_order(),
            biological_order: default_date_order(),
            journal_order: default_journal_order(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_locations_order() -> String {
    "arrival_date".to_string()
}

fn default_date_order() -> String {
    "date".to_string()
}

fn default_journal_order() -> String {
    "-date".to_string()
}

/// Ceilings used to put raw readings on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// °C mapped to 100.
    #[serde(default = "default_temperature_scale")]
    pub temperature_scale: f64,

    /// Lux mapped to 100.
    #[serde(default = "default_light_scale")]
    pub light_scale: f64,

    /// AQI mapped to 100.
    #[serde(default = "default_air_quality_scale")]
    pub air_quality_scale: f64,

    /// dB mapped to 100.
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f64,

    /// HRV (ms) that earns a full HRV sub-score in the harmony score.
    #[serde(default = "default_hrv_reference")]
    pub hrv_reference: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            temperature_scale: default_temperature_scale(),
            light_scale: default_light_scale(),
            air_quality_scale: default_air_quality_scale(),
            noise_scale: default_noise_scale(),
            hrv_reference: default_hrv_reference(),
        }
    }
}

fn default_temperature_scale() -> f64 {
    40.0
}

fn default_light_scale() -> f64 {
    10_000.0
}

fn default_air_quality_scale() -> f64 {
    200.0
}

fn default_noise_scale() -> f64 {
    100.0
}

fn default_hrv_reference() -> f64 {
    50.0
}

impl ThresholdsConfig {
    /// Every scale must be a positive finite number.
    pub fn validate(&self) -> Result<(), String> {
        let scales = [
            ("temperature_scale", self.temperature_scale),
            ("light_scale", self.light_scale),
            ("air_quality_scale", self.air_quality_scale),
            ("noise_scale", self.noise_scale),
            ("hrv_reference", self.hrv_reference),
        ];

        for (name, value) in scales {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("Threshold {} must be positive, got {}", name, value));
            }
        }

        Ok(())
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the day-by-day timeline tables.
    #[serde(default = "default_true")]
    pub include_timeline: bool,

    /// Maximum rows per timeline table.
    #[serde(default = "default_max_timeline_rows")]
    pub max_timeline_rows: usize,

    /// Maximum highlight moments listed.
    #[serde(default = "default_highlight_limit")]
    pub highlight_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_timeline: true,
            max_timeline_rows: default_max_timeline_rows(),
            highlight_limit: default_highlight_limit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_timeline_rows() -> usize {
    31
}

fn default_highlight_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_dir) = args.data_dir {
            self.source.data_dir = data_dir.display().to_string();
        }
        if let Some(ref api_url) = args.api_url {
            self.source.api_url = Some(api_url.clone());
        }
        if let Some(ref api_key) = args.api_key {
            self.source.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(ref scope) = args.scope {
            self.general.scope = scope.to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if args.no_timeline {
            self.report.include_timeline = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
