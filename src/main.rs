//! JourneyLens - journey analytics dashboard
//!
//! A CLI tool that loads a journey's locations, environmental readings,
//! biometric readings and journal entries, and writes a dashboard report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, unreachable source, etc.)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use journeylens::analysis::NormalizationScales;
use journeylens::cli::{Args, OutputFormat};
use journeylens::config::{Config, CONFIG_FILE_NAME};
use journeylens::models::{NewJournalEntry, Scope};
use journeylens::report::{self, Dashboard};
use journeylens::source::{HttpSource, LocalSource, RecordSource, Snapshot, SourceOrdering};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration; `[general] verbose` decides the log level
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("JourneyLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("General settings: {:?}", config.general);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .journeylens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the data source, scales and report layout.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete workflow. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    config
        .thresholds
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid [thresholds] configuration: {}", e))?;

    let scope: Scope = config
        .general
        .scope
        .parse()
        .map_err(|e: String| anyhow::anyhow!("Invalid scope: {}", e))?;
    let ordering = SourceOrdering::try_from(&config.source)?;
    let today = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let source = build_source(&config)?;
    println!("📂 Record source: {}", source.describe());

    // Handle --new-entry: create the entry and exit
    if let Some(ref draft_path) = args.new_entry {
        return handle_new_entry(source.as_ref(), draft_path).await;
    }

    // Step 1: Load the snapshot
    let snapshot = load_snapshot(source.as_ref(), &ordering, args.quiet).await?;

    if let Scope::Location(ref id) = scope {
        if !snapshot.locations.iter().any(|l| &l.id == id) {
            warn!("Scope {} does not match any known location", id);
        }
    }

    // Handle --list-locations: print the itinerary and exit
    if args.list_locations {
        return Ok(handle_list_locations(&snapshot, today));
    }

    // Step 2: Build the dashboard
    println!("\n🧮 Aggregating {} records for scope {}...", snapshot.record_count(), scope);
    let scales = NormalizationScales::from(&config.thresholds);
    let dashboard = Dashboard::build(&snapshot, &scope, &scales, today, source.describe());

    // Step 3: Render and save the report
    println!("📝 Generating report...");
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&dashboard)?,
        OutputFormat::Markdown => report::generate_markdown_report(&dashboard, &config.report),
    };

    let output_path = output_path(&args, &config);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    let overview = &dashboard.overview;
    println!("\n📊 Journey Summary ({}):", dashboard.metadata.scope_name);
    println!(
        "   Locations: {} across {} countries, {} days on the road",
        overview.locations, overview.countries, overview.days_on_road
    );
    println!(
        "   Readings: {} environmental | {} biometric | {} journal entries",
        overview.environmental_readings, overview.biological_readings, overview.journal_entries
    );
    println!(
        "   Average mood: {} | Average harmony: {}",
        format_optional(overview.average_mood),
        format_optional(overview.average_harmony)
    );
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Dashboard complete! Report saved to: {}", output_path.display());

    Ok(0)
}

/// Pick the record source: the entities API when a URL is configured,
/// otherwise the local data directory.
fn build_source(config: &Config) -> Result<Box<dyn RecordSource>> {
    match config.source.api_url {
        Some(ref api_url) => {
            info!("Using entities API at {}", api_url);
            let source = HttpSource::new(
                api_url,
                config.source.api_key.clone(),
                config.source.timeout_seconds,
            )?;
            Ok(Box::new(source))
        }
        None => {
            let data_dir = PathBuf::from(&config.source.data_dir);
            info!("Using data directory: {}", data_dir.display());
            Ok(Box::new(LocalSource::new(data_dir)))
        }
    }
}

/// Load every collection behind a spinner.
async fn load_snapshot(
    source: &dyn RecordSource,
    ordering: &SourceOrdering,
    quiet: bool,
) -> Result<Snapshot> {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Loading journey records...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = Snapshot::load(source, ordering).await;

    match result {
        Ok(snapshot) => {
            spinner.finish_with_message(format!(
                "Loaded {} locations and {} records",
                snapshot.locations.len(),
                snapshot.record_count()
            ));
            Ok(snapshot)
        }
        Err(e) => {
            spinner.abandon_with_message("Failed to load journey records");
            Err(anyhow::Error::from(e).context("Failed to load journey records"))
        }
    }
}

/// Handle --new-entry: read a JSON draft, store it, print the stored entry.
async fn handle_new_entry(source: &dyn RecordSource, draft_path: &Path) -> Result<i32> {
    let content = std::fs::read_to_string(draft_path)
        .with_context(|| format!("Failed to read draft {}", draft_path.display()))?;
    let draft: NewJournalEntry = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse draft {}", draft_path.display()))?;

    let entry = source.create_journal_entry(draft).await?;

    println!("\n✅ Journal entry created: {} ({})", entry.title, entry.id);
    println!("   Date: {}", entry.date);
    if let Some(mood) = entry.mood_score {
        println!("   Mood: {:.0}/10", mood);
    }
    if !entry.emotions.is_empty() {
        let emotions: Vec<&str> = entry.emotions.iter().map(|e| e.as_str()).collect();
        println!("   Emotions: {}", emotions.join(", "));
    }
    Ok(0)
}

/// Handle --list-locations: print the itinerary in source order.
fn handle_list_locations(snapshot: &Snapshot, today: NaiveDate) -> i32 {
    println!();
    if snapshot.locations.is_empty() {
        println!("   No locations recorded yet.");
        return 0;
    }

    println!("   Found {} locations:\n", snapshot.locations.len());
    for location in &snapshot.locations {
        let marker = if location.is_current(today) { "📍" } else { "  " };
        let until = location
            .departure_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "now".to_string());
        println!(
            "   {} {} ({}) [{}]: {} → {}, {} days",
            marker,
            location.name,
            location.country,
            location.id,
            location.arrival_date,
            until,
            location.stay_days(today)
        );
    }
    0
}

/// Report path; the default name follows the chosen format.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    let path = PathBuf::from(&config.general.output);
    if args.output.is_none() && config.general.output == Config::default().general.output {
        return path.with_extension(args.format.extension());
    }
    path
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", CONFIG_FILE_NAME, e);
            eprintln!("   Continuing with default settings.");
            Ok(Config::default())
        }
    }
}
