//! Data models for the journey dashboard.
//!
//! This module contains the four record collections served by the data
//! source (locations, environmental readings, biological readings and
//! journal entries) together with the small traits the aggregation engine
//! uses to read them generically.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Records that reference a [`Location`] by id.
pub trait Located {
    fn location_id(&self) -> Option<&str>;
}

/// Records stamped with a calendar date.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// Records exposing named numeric readings.
///
/// A reading that is absent in the stored record comes back as `None`; the
/// aggregation engine decides how to treat it.
pub trait Measured {
    /// The set of fields this record can be measured on.
    type Field: Copy + fmt::Display;

    fn reading(&self, field: Self::Field) -> Option<f64>;
}

/// The location filter applied to every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Scope {
    /// Every location of the journey.
    #[default]
    All,
    /// A single location id.
    Location(String),
}

impl Scope {
    /// Returns true when a record with the given location id is in scope.
    pub fn matches(&self, location_id: Option<&str>) -> bool {
        match self {
            Scope::All => true,
            Scope::Location(id) => location_id == Some(id.as_str()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Location(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Scope cannot be empty".to_string());
        }
        if trimmed.eq_ignore_ascii_case("all") {
            Ok(Scope::All)
        } else {
            Ok(Scope::Location(trimmed.to_string()))
        }
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}

/// A stop on the journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub arrival_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Location {
    /// Calendar days spent at this location, counting arrival and departure
    /// days. An open stay runs until `today`.
    pub fn stay_days(&self, today: NaiveDate) -> i64 {
        let end = self.departure_date.unwrap_or(today);
        (end - self.arrival_date).num_days().max(0) + 1
    }

    /// Whether the traveller is at this location on `today`.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.arrival_date <= today && self.departure_date.map_or(true, |d| d >= today)
    }

    /// Checks the coordinate and date invariants of the record.
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!(
                "Latitude {} of {} is outside [-90, 90]",
                self.latitude, self.name
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!(
                "Longitude {} of {} is outside [-180, 180]",
                self.longitude, self.name
            ));
        }
        if let Some(departure) = self.departure_date {
            if departure < self.arrival_date {
                return Err(format!(
                    "{} departs ({}) before it arrives ({})",
                    self.name, departure, self.arrival_date
                ));
            }
        }
        Ok(())
    }
}

/// Daily environmental reading at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    pub id: String,
    #[serde(default)]
    pub location_id: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub temperature_avg: Option<f64>,
    #[serde(default)]
    pub temperature_min: Option<f64>,
    #[serde(default)]
    pub temperature_max: Option<f64>,
    /// Relative humidity in percent.
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Light exposure in lux.
    #[serde(default)]
    pub light_exposure: Option<f64>,
    #[serde(default)]
    pub air_quality_index: Option<f64>,
    /// Noise level in dB.
    #[serde(default)]
    pub noise_level: Option<f64>,
    #[serde(default)]
    pub weather_condition: Option<String>,
}

/// Numeric fields of [`EnvironmentalData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvField {
    TemperatureAvg,
    TemperatureMin,
    TemperatureMax,
    Humidity,
    LightExposure,
    AirQualityIndex,
    NoiseLevel,
}

impl EnvField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvField::TemperatureAvg => "temperature_avg",
            EnvField::TemperatureMin => "temperature_min",
            EnvField::TemperatureMax => "temperature_max",
            EnvField::Humidity => "humidity",
            EnvField::LightExposure => "light_exposure",
            EnvField::AirQualityIndex => "air_quality_index",
            EnvField::NoiseLevel => "noise_level",
        }
    }
}

impl fmt::Display for EnvField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Measured for EnvironmentalData {
    type Field = EnvField;

    fn reading(&self, field: EnvField) -> Option<f64> {
        match field {
            EnvField::TemperatureAvg => self.temperature_avg,
            EnvField::TemperatureMin => self.temperature_min,
            EnvField::TemperatureMax => self.temperature_max,
            EnvField::Humidity => self.humidity,
            EnvField::LightExposure => self.light_exposure,
            EnvField::AirQualityIndex => self.air_quality_index,
            EnvField::NoiseLevel => self.noise_level,
        }
    }
}

impl Located for EnvironmentalData {
    fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }
}

impl Dated for EnvironmentalData {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Daily biometric reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiologicalData {
    pub id: String,
    #[serde(default)]
    pub location_id: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub heart_rate_resting: Option<f64>,
    #[serde(default)]
    pub heart_rate_active: Option<f64>,
    /// Heart rate variability in ms.
    #[serde(default)]
    pub heart_rate_variability: Option<f64>,
    #[serde(default)]
    pub body_temperature: Option<f64>,
    /// 0-10.
    #[serde(default)]
    pub sleep_quality_score: Option<f64>,
    /// Hours.
    #[serde(default)]
    pub sleep_duration: Option<f64>,
    #[serde(default)]
    pub respiratory_rate: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<f64>,
    /// 0-10.
    #[serde(default)]
    pub stress_level: Option<f64>,
}

/// Numeric fields of [`BiologicalData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BioField {
    HeartRateResting,
    HeartRateActive,
    HeartRateVariability,
    BodyTemperature,
    SleepQualityScore,
    SleepDuration,
    RespiratoryRate,
    ActivityLevel,
    StressLevel,
}

impl BioField {
    pub fn as_str(&self) -> &'static str {
        match self {
            BioField::HeartRateResting => "heart_rate_resting",
            BioField::HeartRateActive => "heart_rate_active",
            BioField::HeartRateVariability => "heart_rate_variability",
            BioField::BodyTemperature => "body_temperature",
            BioField::SleepQualityScore => "sleep_quality_score",
            BioField::SleepDuration => "sleep_duration",
            BioField::RespiratoryRate => "respiratory_rate",
            BioField::ActivityLevel => "activity_level",
            BioField::StressLevel => "stress_level",
        }
    }
}

impl fmt::Display for BioField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Measured for BiologicalData {
    type Field = BioField;

    fn reading(&self, field: BioField) -> Option<f64> {
        match field {
            BioField::HeartRateResting => self.heart_rate_resting,
            BioField::HeartRateActive => self.heart_rate_active,
            BioField::HeartRateVariability => self.heart_rate_variability,
            BioField::BodyTemperature => self.body_temperature,
            BioField::SleepQualityScore => self.sleep_quality_score,
            BioField::SleepDuration => self.sleep_duration,
            BioField::RespiratoryRate => self.respiratory_rate,
            BioField::ActivityLevel => self.activity_level,
            BioField::StressLevel => self.stress_level,
        }
    }
}

impl Located for BiologicalData {
    fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }
}

impl Dated for BiologicalData {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Emotions a journal entry can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joyful,
    Peaceful,
    Excited,
    Grateful,
    Curious,
    Inspired,
    Nostalgic,
    Reflective,
    Tired,
    Anxious,
    Homesick,
    Overwhelmed,
}

impl Emotion {
    pub const ALL: [Emotion; 12] = [
        Emotion::Joyful,
        Emotion::Peaceful,
        Emotion::Excited,
        Emotion::Grateful,
        Emotion::Curious,
        Emotion::Inspired,
        Emotion::Nostalgic,
        Emotion::Reflective,
        Emotion::Tired,
        Emotion::Anxious,
        Emotion::Homesick,
        Emotion::Overwhelmed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joyful => "joyful",
            Emotion::Peaceful => "peaceful",
            Emotion::Excited => "excited",
            Emotion::Grateful => "grateful",
            Emotion::Curious => "curious",
            Emotion::Inspired => "inspired",
            Emotion::Nostalgic => "nostalgic",
            Emotion::Reflective => "reflective",
            Emotion::Tired => "tired",
            Emotion::Anxious => "anxious",
            Emotion::Homesick => "homesick",
            Emotion::Overwhelmed => "overwhelmed",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A journal entry written during the journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    #[serde(default)]
    pub location_id: Option<String>,
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub emotions: Vec<Emotion>,
    /// 1-10.
    #[serde(default)]
    pub mood_score: Option<f64>,
    #[serde(default)]
    pub highlight_moment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl JournalEntry {
    /// Materializes a stored entry from a validated draft.
    pub fn from_draft(id: String, draft: NewJournalEntry) -> Self {
        Self {
            id,
            location_id: draft.location_id,
            date: draft.date,
            title: draft.title,
            content: draft.content,
            emotions: draft.emotions,
            mood_score: Some(f64::from(draft.mood_score)),
            highlight_moment: draft.highlight_moment,
            image_url: draft.image_url,
            audio_url: draft.audio_url,
        }
    }
}

/// Numeric fields of [`JournalEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalField {
    MoodScore,
}

impl fmt::Display for JournalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalField::MoodScore => write!(f, "mood_score"),
        }
    }
}

impl Measured for JournalEntry {
    type Field = JournalField;

    fn reading(&self, field: JournalField) -> Option<f64> {
        match field {
            JournalField::MoodScore => self.mood_score,
        }
    }
}

impl Located for JournalEntry {
    fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }
}

impl Dated for JournalEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A journal entry as submitted by the entry form, before the data source
/// assigns it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    #[serde(default)]
    pub location_id: Option<String>,
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub emotions: Vec<Emotion>,
    pub mood_score: u8,
    #[serde(default)]
    pub highlight_moment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl NewJournalEntry {
    /// Validate the draft before it is sent to the data source.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Journal entry title cannot be empty".to_string());
        }

        if !(1..=10).contains(&self.mood_score) {
            return Err(format!(
                "Mood score must be between 1 and 10, got {}",
                self.mood_score
            ));
        }

        let mut seen = Vec::with_capacity(self.emotions.len());
        for emotion in &self.emotions {
            if seen.contains(emotion) {
                return Err(format!("Emotion '{}' is listed more than once", emotion));
            }
            seen.push(*emotion);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lisbon() -> Location {
        Location {
            id: "loc-1".to_string(),
            name: "Lisbon".to_string(),
            country: "Portugal".to_string(),
            latitude: 38.72,
            longitude: -9.14,
            arrival_date: date(2024, 3, 1),
            departure_date: Some(date(2024, 3, 5)),
            description: None,
            image_url: None,
        }
    }

    fn draft() -> NewJournalEntry {
        NewJournalEntry {
            location_id: Some("loc-1".to_string()),
            date: date(2024, 3, 2),
            title: "Tram 28".to_string(),
            content: "Rode the old tram up to Alfama.".to_string(),
            emotions: vec![Emotion::Joyful, Emotion::Curious],
            mood_score: 8,
            highlight_moment: true,
            image_url: None,
            audio_url: None,
        }
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("all".parse::<Scope>().unwrap(), Scope::All);
        assert_eq!("ALL".parse::<Scope>().unwrap(), Scope::All);
        assert_eq!(
            "loc-7".parse::<Scope>().unwrap(),
            Scope::Location("loc-7".to_string())
        );
        assert!("  ".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_matches() {
        let scope = Scope::Location("loc-1".to_string());
        assert!(scope.matches(Some("loc-1")));
        assert!(!scope.matches(Some("loc-2")));
        assert!(!scope.matches(None));
        assert!(Scope::All.matches(None));
    }

    #[test]
    fn test_stay_days() {
        let mut location = lisbon();
        assert_eq!(location.stay_days(date(2024, 4, 1)), 5);

        location.departure_date = None;
        assert_eq!(location.stay_days(date(2024, 3, 3)), 3);
        assert!(location.is_current(date(2024, 3, 3)));
        assert!(!location.is_current(date(2024, 2, 28)));
    }

    #[test]
    fn test_location_validation() {
        assert!(lisbon().validate().is_ok());

        let mut bad = lisbon();
        bad.latitude = 91.0;
        assert!(bad.validate().is_err());

        let mut bad = lisbon();
        bad.longitude = -180.5;
        assert!(bad.validate().is_err());

        let mut bad = lisbon();
        bad.departure_date = Some(date(2024, 2, 1));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_missing_readings_deserialize_as_none() {
        let json = r#"{"id":"env-1","location_id":"loc-1","date":"2024-03-02","humidity":64.0}"#;
        let reading: EnvironmentalData = serde_json::from_str(json).unwrap();
        assert_eq!(reading.reading(EnvField::Humidity), Some(64.0));
        assert_eq!(reading.reading(EnvField::TemperatureAvg), None);
    }

    #[test]
    fn test_emotion_serde() {
        let emotions: Vec<Emotion> = serde_json::from_str(r#"["joyful","homesick"]"#).unwrap();
        assert_eq!(emotions, vec![Emotion::Joyful, Emotion::Homesick]);
        assert!(serde_json::from_str::<Emotion>(r#""furious""#).is_err());
        assert_eq!(Emotion::ALL.len(), 12);
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut bad = draft();
        bad.title = "   ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = draft();
        bad.mood_score = 0;
        assert!(bad.validate().is_err());

        let mut bad = draft();
        bad.emotions = vec![Emotion::Tired, Emotion::Tired];
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_entry_from_draft() {
        let entry = JournalEntry::from_draft("entry-1".to_string(), draft());
        assert_eq!(entry.id, "entry-1");
        assert_eq!(entry.mood_score, Some(8.0));
        assert_eq!(entry.reading(JournalField::MoodScore), Some(8.0));
        assert!(entry.highlight_moment);
    }
}
