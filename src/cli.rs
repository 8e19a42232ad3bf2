//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Scope;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// JourneyLens - environmental, biometric and journal analytics for a journey
///
/// Loads the journey's locations, environmental readings, biometric readings
/// and journal entries from a data directory or an entities API, and writes
/// a dashboard report in Markdown or JSON.
///
/// Examples:
///   journeylens --data-dir ./data
///   journeylens --data-dir ./data --scope loc-3 --format json
///   journeylens --api-url https://journey.example.com/api --api-key TOKEN
///   journeylens --data-dir ./data --new-entry draft.json
///   journeylens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding the JSON record collections
    #[arg(short, long, value_name = "DIR", env = "JOURNEYLENS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the entities API (takes precedence over --data-dir)
    #[arg(long, value_name = "URL", env = "JOURNEYLENS_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the entities API
    #[arg(long, value_name = "KEY", env = "JOURNEYLENS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Location scope: "all" or a location id
    #[arg(short, long, value_name = "SCOPE")]
    pub scope: Option<Scope>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .journeylens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds for the entities API
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Date the report is computed for (defaults to today)
    ///
    /// Open stays and days on the road are measured up to this date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Leave the day-by-day timeline tables out of the report
    #[arg(long)]
    pub no_timeline: bool,

    /// Create a journal entry from a JSON draft file and exit
    #[arg(long, value_name = "FILE", conflicts_with = "list_locations")]
    pub new_entry: Option<PathBuf>,

    /// Print the journey itinerary and exit
    #[arg(long)]
    pub list_locations: bool,

    /// Generate a default .journeylens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Default file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // The data directory only matters when no API is configured
        if self.api_url.is_none() {
            if let Some(ref data_dir) = self.data_dir {
                if !data_dir.exists() && self.new_entry.is_none() {
                    return Err(format!(
                        "Data directory does not exist: {}",
                        data_dir.display()
                    ));
                }
                if data_dir.exists() && !data_dir.is_dir() {
                    return Err(format!(
                        "Data path is not a directory: {}",
                        data_dir.display()
                    ));
                }
            }
        }

        if let Some(ref draft) = self.new_entry {
            if !draft.is_file() {
                return Err(format!(
                    "Journal entry draft not found: {}",
                    draft.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the configuration file;
    /// `--quiet` wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
