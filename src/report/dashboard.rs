//! Dashboard assembly.
//!
//! Turns a scoped snapshot into the page-level figures the renderers print.

use crate::analysis::{
    average, dominant_emotion, emotion_distribution, environment_profiles, extremum,
    filter_by_location, group_and_average_by_location, harmony_score_with, harmony_timeline,
    highlights, journey_overview, project_time_series, resolve_location_name, summarize_metric,
    Companions, EmotionCount, EnvironmentProfile, Extreme, HarmonyField, HarmonyPoint,
    JourneyOverview, LocationAverages, MetricSummary, NormalizationScales, TimeSeriesPoint,
};
use crate::models::{
    BioField, Emotion, EnvField, EnvironmentalData, JournalEntry, JournalField, Scope,
};
use crate::source::Snapshot;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

/// Metadata about the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetadata {
    /// When the dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Date open stays are measured up to.
    pub as_of: NaiveDate,
    /// Description of the record source.
    pub source: String,
    pub scope: Scope,
    /// Display name of the scope.
    pub scope_name: String,
}

/// A single day's value of some metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayValue {
    pub date: NaiveDate,
    pub location_name: String,
    pub value: f64,
}

/// Environment page.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentPage {
    /// Average temperature with the coldest minimum and hottest maximum.
    pub temperature: MetricSummary,
    pub humidity: MetricSummary,
    pub light: MetricSummary,
    pub air_quality: MetricSummary,
    pub noise: MetricSummary,
    pub hottest_day: Option<DayValue>,
    pub coldest_day: Option<DayValue>,
    pub by_location: Vec<LocationAverages<EnvField>>,
    pub profiles: Vec<EnvironmentProfile>,
    pub timeline: Vec<TimeSeriesPoint<EnvironmentalData>>,
}

/// Biometrics page.
#[derive(Debug, Clone, Serialize)]
pub struct BiometricsPage {
    pub resting_heart_rate: MetricSummary,
    pub heart_rate_variability: MetricSummary,
    pub sleep_quality: MetricSummary,
    pub sleep_duration: MetricSummary,
    pub stress: MetricSummary,
    /// Harmony score average with its daily low and high.
    pub harmony: MetricSummary,
    pub best_day: Option<HarmonyPoint>,
    pub toughest_day: Option<HarmonyPoint>,
    pub by_location: Vec<LocationAverages<BioField>>,
    pub timeline: Vec<HarmonyPoint>,
}

/// Journal page.
#[derive(Debug, Clone, Serialize)]
pub struct JournalPage {
    pub entries: usize,
    pub mood: MetricSummary,
    pub emotions: Vec<EmotionCount>,
    pub dominant_emotion: Option<Emotion>,
    pub highlights: Vec<JournalEntry>,
    pub best_mood_entry: Option<JournalEntry>,
}

/// One row of the location comparison table. `None` means no readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationComparison {
    pub location_id: String,
    pub location_name: String,
    pub country: String,
    pub stay_days: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub air_quality: Option<f64>,
    pub heart_rate_variability: Option<f64>,
    pub stress: Option<f64>,
    pub harmony: Option<f64>,
    pub mood: Option<f64>,
}

/// The complete dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub metadata: DashboardMetadata,
    pub overview: JourneyOverview,
    pub environment: EnvironmentPage,
    pub biometrics: BiometricsPage,
    pub journal: JournalPage,
    pub comparison: Vec<LocationComparison>,
}

impl Dashboard {
    /// Build every page for `scope` from a full snapshot.
    pub fn build(
        snapshot: &Snapshot,
        scope: &Scope,
        scales: &NormalizationScales,
        as_of: NaiveDate,
        source: String,
    ) -> Self {
        let scoped = snapshot.scoped(scope);
        debug!(
            "Building dashboard for scope {} over {} records",
            scope,
            scoped.record_count()
        );

        let scope_name = match scope {
            Scope::All => "All locations".to_string(),
            Scope::Location(id) => {
                resolve_location_name(&snapshot.locations, Some(id.as_str())).to_string()
            }
        };

        Self {
            metadata: DashboardMetadata {
                generated_at: Utc::now(),
                as_of,
                source,
                scope: scope.clone(),
                scope_name,
            },
            overview: journey_overview(&scoped, scope, scales.hrv_reference, as_of),
            environment: build_environment(&scoped, scales),
            biometrics: build_biometrics(&scoped, scales),
            journal: build_journal(&scoped),
            comparison: build_comparison(&scoped, scales, as_of),
        }
    }
}

fn build_environment(snapshot: &Snapshot, scales: &NormalizationScales) -> EnvironmentPage {
    let records = &snapshot.environmental;
    let locations = &snapshot.locations;

    // Days without a temperature reading are not candidates for the extremes.
    let temperature_of = |r: &EnvironmentalData| r.temperature_avg.unwrap_or(f64::NAN);
    let to_day = |r: &EnvironmentalData| DayValue {
        date: r.date,
        location_name: resolve_location_name(locations, r.location_id.as_deref()).to_string(),
        value: temperature_of(r),
    };

    EnvironmentPage {
        temperature: summarize_metric(
            records,
            EnvField::TemperatureAvg,
            Companions::range(EnvField::TemperatureMin, EnvField::TemperatureMax),
        ),
        humidity: summarize_metric(records, EnvField::Humidity, Companions::none()),
        light: summarize_metric(records, EnvField::LightExposure, Companions::none()),
        air_quality: summarize_metric(records, EnvField::AirQualityIndex, Companions::none()),
        noise: summarize_metric(records, EnvField::NoiseLevel, Companions::none()),
        hottest_day: extremum(records, temperature_of, Extreme::Max).map(to_day),
        coldest_day: extremum(records, temperature_of, Extreme::Min).map(to_day),
        by_location: group_and_average_by_location(
            records,
            locations,
            &[
                EnvField::TemperatureAvg,
                EnvField::Humidity,
                EnvField::LightExposure,
                EnvField::AirQualityIndex,
                EnvField::NoiseLevel,
            ],
        ),
        profiles: environment_profiles(records, locations, scales),
        timeline: project_time_series(records, locations),
    }
}

fn build_biometrics(snapshot: &Snapshot, scales: &NormalizationScales) -> BiometricsPage {
    let records = &snapshot.biological;
    let timeline = harmony_timeline(records, &snapshot.locations, scales);

    BiometricsPage {
        resting_heart_rate: summarize_metric(
            records,
            BioField::HeartRateResting,
            Companions::range(BioField::HeartRateResting, BioField::HeartRateResting),
        ),
        heart_rate_variability: summarize_metric(
            records,
            BioField::HeartRateVariability,
            Companions::range(BioField::HeartRateVariability, BioField::HeartRateVariability),
        ),
        sleep_quality: summarize_metric(records, BioField::SleepQualityScore, Companions::none()),
        sleep_duration: summarize_metric(records, BioField::SleepDuration, Companions::none()),
        stress: summarize_metric(records, BioField::StressLevel, Companions::none()),
        harmony: summarize_metric(
            &timeline,
            HarmonyField::Score,
            Companions::range(HarmonyField::Score, HarmonyField::Score),
        ),
        best_day: extremum(&timeline, |p| p.score, Extreme::Max).cloned(),
        toughest_day: extremum(&timeline, |p| p.score, Extreme::Min).cloned(),
        by_location: group_and_average_by_location(
            records,
            &snapshot.locations,
            &[
                BioField::HeartRateResting,
                BioField::HeartRateVariability,
                BioField::SleepQualityScore,
                BioField::StressLevel,
            ],
        ),
        timeline,
    }
}

fn build_journal(snapshot: &Snapshot) -> JournalPage {
    let entries = &snapshot.journal;

    JournalPage {
        entries: entries.len(),
        mood: summarize_metric(
            entries,
            JournalField::MoodScore,
            Companions::range(JournalField::MoodScore, JournalField::MoodScore),
        ),
        emotions: emotion_distribution(entries),
        dominant_emotion: dominant_emotion(entries),
        highlights: highlights(entries),
        best_mood_entry: extremum(
            entries,
            |e| e.mood_score.unwrap_or(f64::NAN),
            Extreme::Max,
        )
        .cloned(),
    }
}

fn build_comparison(
    snapshot: &Snapshot,
    scales: &NormalizationScales,
    as_of: NaiveDate,
) -> Vec<LocationComparison> {
    snapshot
        .locations
        .iter()
        .filter_map(|location| {
            let scope = Scope::Location(location.id.clone());
            let environmental = filter_by_location(&snapshot.environmental, &scope);
            let biological = filter_by_location(&snapshot.biological, &scope);
            let journal = filter_by_location(&snapshot.journal, &scope);

            if environmental.is_empty() && biological.is_empty() && journal.is_empty() {
                return None;
            }

            let harmony = if biological.is_empty() {
                None
            } else {
                let total: f64 = biological
                    .iter()
                    .map(|r| harmony_score_with(r, scales.hrv_reference))
                    .sum();
                Some(total / biological.len() as f64)
            };

            Some(LocationComparison {
                location_id: location.id.clone(),
                location_name: location.name.clone(),
                country: location.country.clone(),
                stay_days: location.stay_days(as_of),
                temperature: average(&environmental, EnvField::TemperatureAvg),
                humidity: average(&environmental, EnvField::Humidity),
                air_quality: average(&environmental, EnvField::AirQualityIndex),
                heart_rate_variability: average(&biological, BioField::HeartRateVariability),
                stress: average(&biological, BioField::StressLevel),
                harmony,
                mood: average(&journal, JournalField::MoodScore),
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{BiologicalData, Location};

    pub(crate) fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    pub(crate) fn sample_snapshot() -> Snapshot {
        let location = |id: &str, name: &str, arrival: u32, departure: Option<u32>| Location {
            id: id.to_string(),
            name: name.to_string(),
            country: "Portugal".to_string(),
            latitude: 39.0,
            longitude: -9.0,
            arrival_date: date(arrival),
            departure_date: departure.map(date),
            description: None,
            image_url: None,
        };

        let env = |id: &str, loc: &str, day: u32, temp: Option<f64>| EnvironmentalData {
            id: id.to_string(),
            location_id: Some(loc.to_string()),
            date: date(day),
            temperature_avg: temp,
            temperature_min: temp.map(|t| t - 4.0),
            temperature_max: temp.map(|t| t + 4.0),
            humidity: Some(70.0),
            light_exposure: Some(8_000.0),
            air_quality_index: Some(40.0),
            noise_level: Some(55.0),
            weather_condition: Some("sunny".to_string()),
        };

        let bio = |id: &str, loc: &str, day: u32, hrv: f64, sleep: f64, stress: f64| {
            BiologicalData {
                id: id.to_string(),
                location_id: Some(loc.to_string()),
                date: date(day),
                heart_rate_resting: Some(58.0),
                heart_rate_active: Some(120.0),
                heart_rate_variability: Some(hrv),
                body_temperature: Some(36.6),
                sleep_quality_score: Some(sleep),
                sleep_duration: Some(7.5),
                respiratory_rate: Some(14.0),
                activity_level: Some(6.0),
                stress_level: Some(stress),
            }
        };

        let entry = |id: &str, loc: &str, day: u32, mood: f64, emotions: Vec<Emotion>, hl: bool| {
            JournalEntry {
                id: id.to_string(),
                location_id: Some(loc.to_string()),
                date: date(day),
                title: format!("Day {}", day),
                content: "Walked a lot.".to_string(),
                emotions,
                mood_score: Some(mood),
                highlight_moment: hl,
                image_url: None,
                audio_url: None,
            }
        };

        Snapshot {
            locations: vec![
                location("lis", "Lisbon", 1, Some(4)),
                location("opo", "Porto", 5, None),
                location("fao", "Faro", 20, None),
            ],
            environmental: vec![
                env("e1", "lis", 1, Some(18.0)),
                env("e2", "lis", 2, Some(22.0)),
                env("e3", "opo", 5, Some(14.0)),
                env("e4", "opo", 6, None),
            ],
            biological: vec![
                bio("b1", "lis", 1, 50.0, 10.0, 0.0),
                bio("b2", "opo", 5, 0.0, 0.0, 10.0),
            ],
            journal: vec![
                entry("j1", "lis", 2, 9.0, vec![Emotion::Joyful, Emotion::Grateful], true),
                entry("j2", "opo", 6, 5.0, vec![Emotion::Tired], false),
            ],
        }
    }

    fn build(scope: Scope) -> Dashboard {
        Dashboard::build(
            &sample_snapshot(),
            &scope,
            &NormalizationScales::default(),
            date(10),
            "test".to_string(),
        )
    }

    #[test]
    fn test_environment_page() {
        let dashboard = build(Scope::All);
        let env = &dashboard.environment;

        // (18 + 22 + 14 + 0) / 4
        assert_eq!(env.temperature.avg, Some(13.5));
        assert_eq!(env.temperature.min, Some(10.0));
        assert_eq!(env.temperature.max, Some(26.0));
        assert_eq!(env.hottest_day.as_ref().map(|d| d.date), Some(date(2)));
        assert_eq!(
            env.coldest_day.as_ref().map(|d| d.location_name.as_str()),
            Some("Porto")
        );
        assert_eq!(env.by_location.len(), 2);
        assert_eq!(env.by_location[0].get(EnvField::TemperatureAvg), Some(20.0));
        assert_eq!(env.profiles[0].temperature, 50.0);
        assert_eq!(env.timeline.len(), 4);
    }

    #[test]
    fn test_biometrics_page() {
        let dashboard = build(Scope::All);
        let bio = &dashboard.biometrics;

        assert_eq!(bio.harmony.avg, Some(50.0));
        assert_eq!(bio.harmony.max, Some(100.0));
        assert_eq!(bio.harmony.min, Some(0.0));
        assert_eq!(bio.best_day.as_ref().map(|p| p.location_name.as_str()), Some("Lisbon"));
        assert_eq!(bio.toughest_day.as_ref().map(|p| p.date), Some(date(5)));
        assert_eq!(bio.resting_heart_rate.avg, Some(58.0));
    }

    #[test]
    fn test_journal_page() {
        let dashboard = build(Scope::All);
        let journal = &dashboard.journal;

        assert_eq!(journal.entries, 2);
        assert_eq!(journal.mood.avg, Some(7.0));
        assert_eq!(journal.highlights.len(), 1);
        assert_eq!(journal.dominant_emotion, Some(Emotion::Joyful));
        assert_eq!(journal.best_mood_entry.as_ref().map(|e| e.id.as_str()), Some("j1"));
    }

    #[test]
    fn test_comparison_skips_locations_without_data() {
        let dashboard = build(Scope::All);
        let names: Vec<_> = dashboard
            .comparison
            .iter()
            .map(|c| c.location_name.as_str())
            .collect();
        assert_eq!(names, vec!["Lisbon", "Porto"]);

        let porto = &dashboard.comparison[1];
        assert_eq!(porto.temperature, Some(7.0));
        assert_eq!(porto.harmony, Some(0.0));
        assert_eq!(porto.stay_days, 6);
    }

    #[test]
    fn test_scoped_dashboard() {
        let dashboard = build(Scope::Location("opo".to_string()));

        assert_eq!(dashboard.metadata.scope_name, "Porto");
        assert_eq!(dashboard.overview.locations, 1);
        assert_eq!(dashboard.overview.days_on_road, 6);
        assert_eq!(dashboard.overview.current_location.as_deref(), Some("Porto"));
        assert_eq!(dashboard.overview.environmental_readings, 2);
        assert_eq!(dashboard.environment.temperature.avg, Some(7.0));
        assert_eq!(dashboard.journal.entries, 1);
        assert_eq!(dashboard.comparison.len(), 1);
    }

    #[test]
    fn test_scope_without_records_reports_no_data() {
        let dashboard = build(Scope::Location("fao".to_string()));

        assert_eq!(dashboard.metadata.scope_name, "Faro");
        assert!(!dashboard.environment.temperature.has_data());
        assert!(dashboard.environment.hottest_day.is_none());
        assert!(dashboard.biometrics.best_day.is_none());
        assert_eq!(dashboard.journal.mood.avg, None);
        assert!(dashboard.comparison.is_empty());
    }
}
