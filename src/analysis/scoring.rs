//! Normalization to display scales and the harmony score.

use crate::analysis::aggregator::{group_and_average_by_location, project_time_series};
use crate::config::ThresholdsConfig;
use crate::models::{BiologicalData, EnvField, EnvironmentalData, Location, Measured};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Ceilings used to map raw readings onto a 0-100 display range.
///
/// These are calibration thresholds picked for the dashboard, not physical
/// limits of the measured quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizationScales {
    /// °C
    pub temperature: f64,
    /// lux
    pub light: f64,
    pub air_quality: f64,
    /// dB
    pub noise: f64,
    /// HRV in ms that scores a full 100.
    pub hrv_reference: f64,
}

impl Default for NormalizationScales {
    fn default() -> Self {
        Self {
            temperature: 40.0,
            light: 10_000.0,
            air_quality: 200.0,
            noise: 100.0,
            hrv_reference: 50.0,
        }
    }
}

impl From<&ThresholdsConfig> for NormalizationScales {
    fn from(config: &ThresholdsConfig) -> Self {
        Self {
            temperature: config.temperature_scale,
            light: config.light_scale,
            air_quality: config.air_quality_scale,
            noise: config.noise_scale,
            hrv_reference: config.hrv_reference,
        }
    }
}

/// Linearly rescale `value` so that `max_scale` maps to 100, capped at 100.
///
/// `max_scale` must be positive. Negative values are not floored.
pub fn normalize(value: f64, max_scale: f64) -> f64 {
    ((value / max_scale) * 100.0).min(100.0)
}

/// Composite wellbeing score with the default HRV reference of 50 ms.
pub fn harmony_score(record: &BiologicalData) -> f64 {
    harmony_score_with(record, NormalizationScales::default().hrv_reference)
}

/// Unweighted mean of the HRV, sleep and inverted-stress sub-scores.
///
/// Sleep quality and stress are expected in [0, 10] and HRV to be
/// non-negative; out-of-range inputs produce an out-of-range score.
/// Absent readings count as zero. For stress that is the best possible
/// value, so a record with no readings at all scores 33.3, not 0.
pub fn harmony_score_with(record: &BiologicalData, hrv_reference: f64) -> f64 {
    let hrv = record.heart_rate_variability.unwrap_or(0.0);
    let sleep = record.sleep_quality_score.unwrap_or(0.0);
    let stress = record.stress_level.unwrap_or(0.0);

    let hrv_score = normalize(hrv, hrv_reference);
    let sleep_score = (sleep / 10.0) * 100.0;
    let stress_score = ((10.0 - stress) / 10.0) * 100.0;

    (hrv_score + sleep_score + stress_score) / 3.0
}

/// Harmony score of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarmonyPoint {
    pub date: NaiveDate,
    pub location_name: String,
    pub score: f64,
}

/// The single numeric field of a [`HarmonyPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonyField {
    Score,
}

impl fmt::Display for HarmonyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "harmony_score")
    }
}

impl Measured for HarmonyPoint {
    type Field = HarmonyField;

    fn reading(&self, _field: HarmonyField) -> Option<f64> {
        Some(self.score)
    }
}

/// Harmony score for every biological reading, in input order.
pub fn harmony_timeline(
    records: &[BiologicalData],
    locations: &[Location],
    scales: &NormalizationScales,
) -> Vec<HarmonyPoint> {
    project_time_series(records, locations)
        .into_iter()
        .map(|point| HarmonyPoint {
            date: point.display_date,
            score: harmony_score_with(&point.record, scales.hrv_reference),
            location_name: point.location_name,
        })
        .collect()
}

/// Environmental radar axes for one location, each on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentProfile {
    pub location_name: String,
    pub temperature: f64,
    /// Already a percentage; passed through.
    pub humidity: f64,
    pub light: f64,
    pub air_quality: f64,
    pub noise: f64,
}

const PROFILE_FIELDS: [EnvField; 5] = [
    EnvField::TemperatureAvg,
    EnvField::Humidity,
    EnvField::LightExposure,
    EnvField::AirQualityIndex,
    EnvField::NoiseLevel,
];

/// Average the environmental readings per location and normalize them for
/// a radar comparison.
pub fn environment_profiles(
    records: &[EnvironmentalData],
    locations: &[Location],
    scales: &NormalizationScales,
) -> Vec<EnvironmentProfile> {
    group_and_average_by_location(records, locations, &PROFILE_FIELDS)
        .into_iter()
        .map(|group| {
            let avg = |field| group.get(field).unwrap_or(0.0);
            EnvironmentProfile {
                temperature: normalize(avg(EnvField::TemperatureAvg), scales.temperature),
                humidity: avg(EnvField::Humidity),
                light: normalize(avg(EnvField::LightExposure), scales.light),
                air_quality: normalize(avg(EnvField::AirQualityIndex), scales.air_quality),
                noise: normalize(avg(EnvField::NoiseLevel), scales.noise),
                location_name: group.location_name,
            }
        })
        .collect()
}
