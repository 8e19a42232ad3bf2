//! Markdown and JSON dashboard rendering.
//!
//! Every "no data" value renders as `n/a`, never as a zero reading.

use crate::analysis::{JourneyOverview, MetricSummary, UNKNOWN_LOCATION};
use crate::config::ReportConfig;
use crate::models::{BioField, EnvField};
use crate::report::dashboard::{
    BiometricsPage, Dashboard, DashboardMetadata, DayValue, EnvironmentPage, JournalPage,
    LocationComparison,
};
use anyhow::Result;

const NO_DATA: &str = "n/a";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(dashboard: &Dashboard, config: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Journey Dashboard\n\n");

    output.push_str(&generate_metadata_section(&dashboard.metadata));
    output.push_str(&generate_overview_section(&dashboard.overview));
    output.push_str(&generate_environment_section(&dashboard.environment, config));
    output.push_str(&generate_biometrics_section(&dashboard.biometrics, config));
    output.push_str(&generate_journal_section(&dashboard.journal, config));
    output.push_str(&generate_comparison_section(&dashboard.comparison));

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

fn value(v: Option<f64>, unit: &str) -> String {
    match v {
        Some(v) if unit.is_empty() => format!("{:.1}", v),
        Some(v) => format!("{:.1} {}", v, unit),
        None => NO_DATA.to_string(),
    }
}

fn summary_row(label: &str, summary: &MetricSummary, unit: &str) -> String {
    format!(
        "| {} | {} | {} | {} |\n",
        label,
        value(summary.avg, unit),
        value(summary.min, unit),
        value(summary.max, unit),
    )
}

/// Table cell text: pipes escaped, line breaks folded into spaces.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote every line of `text`, keeping paragraph breaks inside the quote.
fn blockquote(text: &str) -> String {
    let mut quoted = String::new();
    for line in text.trim_end().lines() {
        if line.trim().is_empty() {
            quoted.push_str(">\n");
        } else {
            quoted.push_str(&format!("> {}\n", line));
        }
    }
    quoted
}

fn hidden_rows_note(total: usize, shown: usize) -> Option<String> {
    (total > shown).then(|| format!("\n*{} more days not shown.*\n", total - shown))
}

fn day(d: &Option<DayValue>, unit: &str) -> String {
    match d {
        Some(d) => format!(
            "{} ({}, {})",
            value(Some(d.value), unit),
            cell(&d.location_name),
            d.date
        ),
        None => NO_DATA.to_string(),
    }
}

fn generate_metadata_section(metadata: &DashboardMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Scope:** {}\n", metadata.scope_name));
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!("- **As of:** {}\n", metadata.as_of));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

fn generate_overview_section(overview: &JourneyOverview) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "- **Locations:** {} across {} countries\n",
        overview.locations, overview.countries
    ));
    section.push_str(&format!("- **Days on the road:** {}\n", overview.days_on_road));
    if let Some(ref current) = overview.current_location {
        section.push_str(&format!("- **Currently in:** {}\n", current));
    }
    section.push_str(&format!(
        "- **Readings:** {} environmental, {} biometric\n",
        overview.environmental_readings, overview.biological_readings
    ));
    section.push_str(&format!(
        "- **Journal:** {} entries, {} highlight moments\n",
        overview.journal_entries, overview.highlight_moments
    ));
    section.push_str(&format!(
        "- **Average mood:** {}\n",
        value(overview.average_mood, "/ 10")
    ));
    section.push_str(&format!(
        "- **Average harmony:** {}\n",
        value(overview.average_harmony, "/ 100")
    ));
    section.push('\n');

    section
}

fn generate_environment_section(page: &EnvironmentPage, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Environment\n\n");
    section.push_str("| Metric | Average | Min | Max |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    section.push_str(&summary_row("Temperature", &page.temperature, "°C"));
    section.push_str(&summary_row("Humidity", &page.humidity, "%"));
    section.push_str(&summary_row("Light", &page.light, "lux"));
    section.push_str(&summary_row("Air quality", &page.air_quality, "AQI"));
    section.push_str(&summary_row("Noise", &page.noise, "dB"));
    section.push('\n');

    section.push_str(&format!("- **Hottest day:** {}\n", day(&page.hottest_day, "°C")));
    section.push_str(&format!("- **Coldest day:** {}\n\n", day(&page.coldest_day, "°C")));

    if !page.by_location.is_empty() {
        section.push_str("### By Location\n\n");
        section.push_str(
            "| Location | Readings | Temperature | Humidity | Light | AQI | Noise |\n",
        );
        section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|:---:|\n");
        for group in &page.by_location {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                cell(&group.location_name),
                group.count,
                value(group.get(EnvField::TemperatureAvg), "°C"),
                value(group.get(EnvField::Humidity), "%"),
                value(group.get(EnvField::LightExposure), "lux"),
                value(group.get(EnvField::AirQualityIndex), ""),
                value(group.get(EnvField::NoiseLevel), "dB"),
            ));
        }
        section.push('\n');
    }

    if !page.profiles.is_empty() {
        section.push_str("### Environment Profile (0-100)\n\n");
        section.push_str("| Location | Temperature | Humidity | Light | Air quality | Noise |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");
        for profile in &page.profiles {
            section.push_str(&format!(
                "| {} | {:.0} | {:.0} | {:.0} | {:.0} | {:.0} |\n",
                cell(&profile.location_name),
                profile.temperature,
                profile.humidity,
                profile.light,
                profile.air_quality,
                profile.noise,
            ));
        }
        section.push('\n');
    }

    if config.include_timeline && !page.timeline.is_empty() {
        section.push_str("### Timeline\n\n");
        section.push_str("| Date | Location | Temperature | Humidity | Weather |\n");
        section.push_str("|:---|:---|:---:|:---:|:---|\n");
        for point in page.timeline.iter().take(config.max_timeline_rows) {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                point.display_date.format("%b %d"),
                cell(&point.location_name),
                value(point.record.temperature_avg, "°C"),
                value(point.record.humidity, "%"),
                cell(point.record.weather_condition.as_deref().unwrap_or(NO_DATA)),
            ));
        }
        if let Some(note) = hidden_rows_note(page.timeline.len(), config.max_timeline_rows) {
            section.push_str(&note);
        }
        section.push('\n');
    }

    section
}

fn generate_biometrics_section(page: &BiometricsPage, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Biometrics\n\n");
    section.push_str("| Metric | Average | Min | Max |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    section.push_str(&summary_row("Harmony score", &page.harmony, ""));
    section.push_str(&summary_row("Resting heart rate", &page.resting_heart_rate, "bpm"));
    section.push_str(&summary_row("HRV", &page.heart_rate_variability, "ms"));
    section.push_str(&summary_row("Sleep quality", &page.sleep_quality, "/ 10"));
    section.push_str(&summary_row("Sleep duration", &page.sleep_duration, "h"));
    section.push_str(&summary_row("Stress", &page.stress, "/ 10"));
    section.push('\n');

    match page.best_day {
        Some(ref best) => section.push_str(&format!(
            "- **Best day:** {:.0} ({}, {})\n",
            best.score, best.location_name, best.date
        )),
        None => section.push_str(&format!("- **Best day:** {}\n", NO_DATA)),
    }
    match page.toughest_day {
        Some(ref worst) => section.push_str(&format!(
            "- **Toughest day:** {:.0} ({}, {})\n\n",
            worst.score, worst.location_name, worst.date
        )),
        None => section.push_str(&format!("- **Toughest day:** {}\n\n", NO_DATA)),
    }

    if !page.by_location.is_empty() {
        section.push_str("### By Location\n\n");
        section.push_str("| Location | Readings | Resting HR | HRV | Sleep | Stress |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");
        for group in &page.by_location {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                cell(&group.location_name),
                group.count,
                value(group.get(BioField::HeartRateResting), "bpm"),
                value(group.get(BioField::HeartRateVariability), "ms"),
                value(group.get(BioField::SleepQualityScore), ""),
                value(group.get(BioField::StressLevel), ""),
            ));
        }
        section.push('\n');
    }

    if config.include_timeline && !page.timeline.is_empty() {
        section.push_str("### Harmony Timeline\n\n");
        section.push_str("| Date | Location | Harmony |\n");
        section.push_str("|:---|:---|:---:|\n");
        for point in page.timeline.iter().take(config.max_timeline_rows) {
            section.push_str(&format!(
                "| {} | {} | {:.0} |\n",
                point.date.format("%b %d"),
                cell(&point.location_name),
                point.score
            ));
        }
        if let Some(note) = hidden_rows_note(page.timeline.len(), config.max_timeline_rows) {
            section.push_str(&note);
        }
        section.push('\n');
    }

    section
}

fn generate_journal_section(page: &JournalPage, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Journal\n\n");
    section.push_str(&format!("- **Entries:** {}\n", page.entries));
    section.push_str(&format!("- **Average mood:** {}\n", value(page.mood.avg, "/ 10")));
    section.push_str(&format!(
        "- **Dominant emotion:** {}\n",
        page.dominant_emotion
            .map(|e| e.to_string())
            .unwrap_or_else(|| NO_DATA.to_string())
    ));
    if let Some(ref best) = page.best_mood_entry {
        section.push_str(&format!(
            "- **Happiest entry:** {} ({})\n",
            best.title, best.date
        ));
    }
    section.push('\n');

    if !page.emotions.is_empty() {
        section.push_str("### Emotions\n\n");
        section.push_str("| Emotion | Count |\n");
        section.push_str("|:---|:---:|\n");

        let mut emotions = page.emotions.clone();
        emotions.sort_by_key(|e| std::cmp::Reverse(e.count));
        for emotion in emotions {
            section.push_str(&format!("| {} | {} |\n", emotion.emotion, emotion.count));
        }
        section.push('\n');
    }

    if !page.highlights.is_empty() {
        section.push_str("### Highlight Moments\n\n");
        for entry in page.highlights.iter().take(config.highlight_limit) {
            section.push_str(&format!("#### {}: {}\n\n", entry.date, cell(&entry.title)));
            if !entry.content.trim().is_empty() {
                section.push_str(&blockquote(&entry.content));
                section.push('\n');
            }
        }
    }

    section
}

fn generate_comparison_section(rows: &[LocationComparison]) -> String {
    let mut section = String::new();

    section.push_str("## Location Comparison\n\n");

    if rows.is_empty() {
        section.push_str("No readings recorded for the selected locations yet.\n\n");
        return section;
    }

    section.push_str(
        "| Location | Country | Days | Temperature | Humidity | AQI | HRV | Stress | Harmony | Mood |\n",
    );
    section.push_str("|:---|:---|:---:|:---:|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    for row in rows {
        let name = if row.location_name.is_empty() {
            UNKNOWN_LOCATION
        } else {
            row.location_name.as_str()
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            cell(name),
            cell(&row.country),
            row.stay_days,
            value(row.temperature, "°C"),
            value(row.humidity, "%"),
            value(row.air_quality, ""),
            value(row.heart_rate_variability, "ms"),
            value(row.stress, ""),
            value(row.harmony, ""),
            value(row.mood, ""),
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by JourneyLens*\n".to_string()
}
