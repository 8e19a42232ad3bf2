//! Record aggregation and statistics.
//!
//! Pure functions over immutable snapshots of the record collections:
//! location-name resolution, scope filtering, time-series projection,
//! metric summaries, per-location averages and extremum lookup.
//!
//! Absent numeric readings are counted as `0` when averaging. This drags
//! averages toward zero when data is sparse; it is kept so the figures match
//! what the dashboard has always shown.

use crate::models::{Dated, Located, Location, Measured, Scope};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Name shown for readings whose location id does not resolve.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Resolve a location id to its display name.
pub fn resolve_location_name<'a>(locations: &'a [Location], location_id: Option<&str>) -> &'a str {
    location_id
        .and_then(|id| locations.iter().find(|location| location.id == id))
        .map(|location| location.name.as_str())
        .unwrap_or(UNKNOWN_LOCATION)
}

/// Keep the records that fall inside `scope`, preserving their order.
pub fn filter_by_location<T: Located + Clone>(records: &[T], scope: &Scope) -> Vec<T> {
    match scope {
        Scope::All => records.to_vec(),
        Scope::Location(_) => records
            .iter()
            .filter(|record| scope.matches(record.location_id()))
            .cloned()
            .collect(),
    }
}

/// A record placed on a timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint<T> {
    /// Raw date of the record; formatting is left to the renderer.
    pub display_date: NaiveDate,
    pub location_name: String,
    pub record: T,
}

/// Attach the date label and resolved location name to every record.
///
/// This is a map, not a sort: points come out in the order the records
/// were fetched.
pub fn project_time_series<T>(records: &[T], locations: &[Location]) -> Vec<TimeSeriesPoint<T>>
where
    T: Dated + Located + Clone,
{
    records
        .iter()
        .map(|record| TimeSeriesPoint {
            display_date: record.date(),
            location_name: resolve_location_name(locations, record.location_id()).to_string(),
            record: record.clone(),
        })
        .collect()
}

/// Companion fields whose record-level extremes accompany an average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Companions<F> {
    pub min: Option<F>,
    pub max: Option<F>,
}

impl<F> Companions<F> {
    /// Average only.
    pub fn none() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Average plus the minimum of `min` and the maximum of `max`.
    pub fn range(min: F, max: F) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Summary statistics for one metric.
///
/// `None` means "no data" and must never be rendered as a zero reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Number of records the summary was computed over.
    pub count: usize,
}

impl MetricSummary {
    pub fn has_data(&self) -> bool {
        self.avg.is_some()
    }
}

/// Mean of `field` with absent readings counted as zero. `None` on empty input.
pub fn average<T: Measured>(records: &[T], field: T::Field) -> Option<f64> {
    mean_of(records.iter(), field)
}

fn mean_of<'a, T, I>(records: I, field: T::Field) -> Option<f64>
where
    T: Measured + 'a,
    I: Iterator<Item = &'a T>,
{
    let (sum, count) = records.fold((0.0, 0usize), |(sum, count), record| {
        (sum + record.reading(field).unwrap_or(0.0), count + 1)
    });

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Average `field` across `records`, plus the minimum of the `min`
/// companion and the maximum of the `max` companion.
///
/// Companion extremes only consider readings that are present.
pub fn summarize_metric<T: Measured>(
    records: &[T],
    field: T::Field,
    companions: Companions<T::Field>,
) -> MetricSummary {
    if records.is_empty() {
        return MetricSummary::default();
    }

    let min = companions.min.and_then(|min_field| {
        records
            .iter()
            .filter_map(|record| record.reading(min_field))
            .fold(None, |acc: Option<f64>, value| {
                Some(acc.map_or(value, |current| current.min(value)))
            })
    });

    let max = companions.max.and_then(|max_field| {
        records
            .iter()
            .filter_map(|record| record.reading(max_field))
            .fold(None, |acc: Option<f64>, value| {
                Some(acc.map_or(value, |current| current.max(value)))
            })
    });

    MetricSummary {
        avg: average(records, field),
        min,
        max,
        count: records.len(),
    }
}

/// Average of a single field inside a location group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldAverage<F> {
    pub field: F,
    pub average: f64,
}

/// Per-field averages for all records sharing a location name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationAverages<F> {
    pub location_name: String,
    pub count: usize,
    pub averages: Vec<FieldAverage<F>>,
}

impl<F: Copy + PartialEq> LocationAverages<F> {
    /// Average of `field`, if it was requested.
    pub fn get(&self, field: F) -> Option<f64> {
        self.averages
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.average)
    }
}

/// Group records by resolved location name and average each requested field.
///
/// Groups come out in the order their first record was encountered.
pub fn group_and_average_by_location<T>(
    records: &[T],
    locations: &[Location],
    fields: &[T::Field],
) -> Vec<LocationAverages<T::Field>>
where
    T: Located + Measured,
{
    let mut order: Vec<(&str, Vec<&T>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let name = resolve_location_name(locations, record.location_id());
        match index.get(name) {
            Some(&slot) => order[slot].1.push(record),
            None => {
                index.insert(name, order.len());
                order.push((name, vec![record]));
            }
        }
    }

    order
        .into_iter()
        .map(|(name, group)| LocationAverages {
            location_name: name.to_string(),
            count: group.len(),
            averages: fields
                .iter()
                .map(|&field| FieldAverage {
                    field,
                    average: mean_of(group.iter().copied(), field).unwrap_or(0.0),
                })
                .collect(),
        })
        .collect()
}

/// Which end of the range [`extremum`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extreme {
    Max,
    Min,
}

/// Find the record with the largest or smallest `selector` value.
///
/// Ties go to the first record reaching the extreme. Records whose selector
/// is NaN are ignored. Returns `None` when there is nothing to compare.
pub fn extremum<T, F>(records: &[T], selector: F, mode: Extreme) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    let mut best: Option<(&T, f64)> = None;

    for record in records {
        let value = selector(record);
        if value.is_nan() {
            continue;
        }

        let replace = match best {
            None => true,
            Some((_, current)) => match mode {
                Extreme::Max => value > current,
                Extreme::Min => value < current,
            },
        };

        if replace {
            best = Some((record, value));
        }
    }

    best.map(|(record, _)| record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BioField, BiologicalData, EnvField, EnvironmentalData};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn location(id: &str, name: &str) -> Location {
        Location {
            id: id.to_string(),
            name: name.to_string(),
            country: "Portugal".to_string(),
            latitude: 38.7,
            longitude: -9.1,
            arrival_date: date(1),
            departure_date: None,
            description: None,
            image_url: None,
        }
    }

    fn env(id: &str, location_id: Option<&str>, day: u32, temp: Option<f64>) -> EnvironmentalData {
        EnvironmentalData {
            id: id.to_string(),
            location_id: location_id.map(String::from),
            date: date(day),
            temperature_avg: temp,
            temperature_min: temp.map(|t| t - 5.0),
            temperature_max: temp.map(|t| t + 5.0),
            humidity: Some(60.0),
            light_exposure: None,
            air_quality_index: None,
            noise_level: None,
            weather_condition: None,
        }
    }

    fn bio(id: &str, location_id: &str, hrv: f64) -> BiologicalData {
        BiologicalData {
            id: id.to_string(),
            location_id: Some(location_id.to_string()),
            date: date(2),
            heart_rate_resting: Some(60.0),
            heart_rate_active: None,
            heart_rate_variability: Some(hrv),
            body_temperature: None,
            sleep_quality_score: Some(7.0),
            sleep_duration: None,
            respiratory_rate: None,
            activity_level: None,
            stress_level: Some(3.0),
        }
    }

    #[test]
    fn test_resolve_location_name() {
        let locations = vec![location("a", "Lisbon"), location("b", "Porto")];

        assert_eq!(resolve_location_name(&locations, Some("b")), "Porto");
        assert_eq!(resolve_location_name(&locations, Some("zzz")), UNKNOWN_LOCATION);
        assert_eq!(resolve_location_name(&locations, None), UNKNOWN_LOCATION);
        assert_eq!(resolve_location_name(&[], Some("a")), UNKNOWN_LOCATION);
    }

    #[test]
    fn test_filter_all_keeps_everything_in_order() {
        let records = vec![
            env("1", Some("b"), 3, Some(10.0)),
            env("2", Some("a"), 1, Some(12.0)),
            env("3", None, 2, None),
        ];

        let filtered = filter_by_location(&records, &Scope::All);
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_filter_by_specific_location() {
        let records = vec![
            env("1", Some("a"), 1, Some(10.0)),
            env("2", Some("b"), 2, Some(12.0)),
            env("3", Some("a"), 3, Some(14.0)),
            env("4", None, 4, Some(16.0)),
        ];

        let filtered = filter_by_location(&records, &Scope::Location("a".to_string()));
        let ids: Vec<_> = filtered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let none = filter_by_location(&records, &Scope::Location("c".to_string()));
        assert!(none.is_empty());
    }

    #[test]
    fn test_project_time_series_preserves_order() {
        let locations = vec![location("a", "Lisbon")];
        let records = vec![
            env("1", Some("a"), 5, Some(10.0)),
            env("2", Some("ghost"), 2, Some(12.0)),
        ];

        let points = project_time_series(&records, &locations);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].display_date, date(5));
        assert_eq!(points[0].location_name, "Lisbon");
        assert_eq!(points[1].location_name, UNKNOWN_LOCATION);
        assert_eq!(points[1].record.id, "2");
    }

    #[test]
    fn test_summarize_counts_missing_as_zero() {
        let records = vec![
            env("1", Some("a"), 1, Some(10.0)),
            env("2", Some("a"), 2, Some(20.0)),
            env("3", Some("a"), 3, None),
        ];

        let summary = summarize_metric(&records, EnvField::TemperatureAvg, Companions::none());
        assert_eq!(summary.avg, Some(10.0));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, None);
        assert_eq!(summary.max, None);
    }

    #[test]
    fn test_summarize_uses_companion_fields_for_range() {
        let records = vec![
            env("1", Some("a"), 1, Some(10.0)),
            env("2", Some("a"), 2, Some(20.0)),
        ];

        let summary = summarize_metric(
            &records,
            EnvField::TemperatureAvg,
            Companions::range(EnvField::TemperatureMin, EnvField::TemperatureMax),
        );
        assert_eq!(summary.avg, Some(15.0));
        assert_eq!(summary.min, Some(5.0));
        assert_eq!(summary.max, Some(25.0));
    }

    #[test]
    fn test_summarize_empty_is_no_data() {
        let records: Vec<EnvironmentalData> = Vec::new();
        let summary = summarize_metric(
            &records,
            EnvField::Humidity,
            Companions::range(EnvField::TemperatureMin, EnvField::TemperatureMax),
        );

        assert!(!summary.has_data());
        assert_eq!(summary, MetricSummary::default());
        assert_eq!(average(&records, EnvField::Humidity), None);
    }

    #[test]
    fn test_group_and_average_by_location() {
        let locations = vec![location("a", "Lisbon"), location("b", "Porto")];
        let records = vec![
            env("1", Some("b"), 1, Some(8.0)),
            env("2", Some("a"), 2, Some(10.0)),
            env("3", Some("a"), 3, Some(20.0)),
            env("4", Some("nowhere"), 4, Some(30.0)),
        ];

        let groups = group_and_average_by_location(
            &records,
            &locations,
            &[EnvField::TemperatureAvg, EnvField::Humidity],
        );

        let names: Vec<_> = groups.iter().map(|g| g.location_name.as_str()).collect();
        assert_eq!(names, vec!["Porto", "Lisbon", UNKNOWN_LOCATION]);

        let lisbon = &groups[1];
        assert_eq!(lisbon.count, 2);
        assert_eq!(lisbon.get(EnvField::TemperatureAvg), Some(15.0));
        assert_eq!(lisbon.get(EnvField::Humidity), Some(60.0));
        assert_eq!(lisbon.get(EnvField::NoiseLevel), None);
    }

    #[test]
    fn test_group_average_counts_missing_as_zero() {
        let locations = vec![location("a", "Lisbon")];
        let records = vec![
            env("1", Some("a"), 1, Some(12.0)),
            env("2", Some("a"), 2, None),
        ];

        let groups =
            group_and_average_by_location(&records, &locations, &[EnvField::TemperatureAvg]);
        assert_eq!(groups[0].get(EnvField::TemperatureAvg), Some(6.0));
    }

    #[test]
    fn test_group_biological_records() {
        let locations = vec![location("a", "Lisbon")];
        let records = vec![bio("1", "a", 40.0), bio("2", "a", 60.0)];

        let groups =
            group_and_average_by_location(&records, &locations, &[BioField::HeartRateVariability]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].get(BioField::HeartRateVariability), Some(50.0));
    }

    #[test]
    fn test_extremum_first_occurrence_wins() {
        let values = [3.0, 5.0, 5.0, 1.0];

        let max = extremum(&values, |v| *v, Extreme::Max).unwrap();
        assert!(std::ptr::eq(max, &values[1]));

        let min = extremum(&values, |v| *v, Extreme::Min);
        assert_eq!(min, Some(&1.0));
    }

    #[test]
    fn test_extremum_ties_on_records() {
        let records = vec![
            env("first", Some("a"), 1, Some(3.0)),
            env("peak-1", Some("a"), 2, Some(5.0)),
            env("peak-2", Some("a"), 3, Some(5.0)),
            env("low", Some("a"), 4, Some(1.0)),
        ];

        let hottest = extremum(
            &records,
            |r| r.temperature_avg.unwrap_or(0.0),
            Extreme::Max,
        );
        assert_eq!(hottest.map(|r| r.id.as_str()), Some("peak-1"));
    }

    #[test]
    fn test_extremum_empty_is_none() {
        let records: Vec<EnvironmentalData> = Vec::new();
        assert!(extremum(&records, |r| r.temperature_avg.unwrap_or(0.0), Extreme::Max).is_none());
        assert!(extremum(&[f64::NAN], |v| *v, Extreme::Min).is_none());
    }
}
