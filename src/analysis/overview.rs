//! Headline figures for the overview page.

use crate::analysis::aggregator::average;
use crate::analysis::scoring::harmony_score_with;
use crate::models::{JournalField, Location, Scope};
use crate::source::Snapshot;
use chrono::NaiveDate;
use serde::Serialize;

/// Headline numbers for the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyOverview {
    /// Locations in scope.
    pub locations: usize,
    pub countries: usize,
    /// First arrival to last departure (or today while still travelling),
    /// over the locations in scope.
    pub days_on_road: i64,
    pub current_location: Option<String>,
    pub environmental_readings: usize,
    pub biological_readings: usize,
    pub journal_entries: usize,
    pub highlight_moments: usize,
    pub average_mood: Option<f64>,
    pub average_harmony: Option<f64>,
}

/// Summarize a snapshot as of `today`.
///
/// The snapshot's records are counted as given; the location figures
/// (count, countries, days on the road, current stay) only consider the
/// locations inside `scope`.
pub fn journey_overview(
    snapshot: &Snapshot,
    scope: &Scope,
    hrv_reference: f64,
    today: NaiveDate,
) -> JourneyOverview {
    let locations: Vec<&Location> = snapshot
        .locations
        .iter()
        .filter(|l| scope.matches(Some(l.id.as_str())))
        .collect();

    let mut countries: Vec<&str> = locations.iter().map(|l| l.country.as_str()).collect();
    countries.sort_unstable();
    countries.dedup();

    let first_arrival = locations.iter().map(|l| l.arrival_date).min();
    let last_departure = locations
        .iter()
        .map(|l| l.departure_date.unwrap_or(today))
        .max();
    let days_on_road = match (first_arrival, last_departure) {
        (Some(start), Some(end)) => (end - start).num_days().max(0) + 1,
        _ => 0,
    };

    let current_location = locations
        .iter()
        .find(|l| l.is_current(today))
        .map(|l| l.name.clone());

    let average_harmony = if snapshot.biological.is_empty() {
        None
    } else {
        let total: f64 = snapshot
            .biological
            .iter()
            .map(|r| harmony_score_with(r, hrv_reference))
            .sum();
        Some(total / snapshot.biological.len() as f64)
    };

    JourneyOverview {
        locations: locations.len(),
        countries: countries.len(),
        days_on_road,
        current_location,
        environmental_readings: snapshot.environmental.len(),
        biological_readings: snapshot.biological.len(),
        journal_entries: snapshot.journal.len(),
        highlight_moments: snapshot
            .journal
            .iter()
            .filter(|e| e.highlight_moment)
            .count(),
        average_mood: average(&snapshot.journal, JournalField::MoodScore),
        average_harmony,
    }
}
