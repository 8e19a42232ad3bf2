//! Record sources for the four journey collections.
//!
//! The dashboard never talks to storage directly: it asks a [`RecordSource`]
//! for full, ordered snapshots of each collection and derives everything
//! from those in memory.

pub mod http;
pub mod local;

pub use http::HttpSource;
pub use local::LocalSource;

use crate::analysis::filter_by_location;
use crate::models::{
    BiologicalData, EnvironmentalData, JournalEntry, Location, NewJournalEntry, Scope,
};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while reading from or writing to a record source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{collection} request failed with status {status}: {body}")]
    Status {
        collection: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid order key '{0}'")]
    InvalidOrder(String),

    #[error("Invalid journal entry: {0}")]
    InvalidEntry(String),
}

/// The four collections served by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Location,
    EnvironmentalData,
    BiologicalData,
    JournalEntry,
}

impl Collection {
    /// Entity name used by the remote API.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Collection::Location => "Location",
            Collection::EnvironmentalData => "EnvironmentalData",
            Collection::BiologicalData => "BiologicalData",
            Collection::JournalEntry => "JournalEntry",
        }
    }

    /// File name used by the local JSON source.
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Location => "locations.json",
            Collection::EnvironmentalData => "environmental_data.json",
            Collection::BiologicalData => "biological_data.json",
            Collection::JournalEntry => "journal_entries.json",
        }
    }
}

/// A sort key such as `date`, `-date` or `arrival_date`.
///
/// A leading `-` sorts descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub key: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn ascending(key: &str) -> Self {
        Self {
            key: key.to_string(),
            descending: false,
        }
    }

    pub fn descending(key: &str) -> Self {
        Self {
            key: key.to_string(),
            descending: true,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}

impl FromStr for OrderBy {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (key, descending) = match trimmed.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };

        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(SourceError::InvalidOrder(s.to_string()));
        }

        Ok(Self {
            key: key.to_string(),
            descending,
        })
    }
}

/// The sort key requested for each collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOrdering {
    pub locations: OrderBy,
    pub environmental: OrderBy,
    pub biological: OrderBy,
    pub journal: OrderBy,
}

impl Default for SourceOrdering {
    fn default() -> Self {
        Self {
            locations: OrderBy::ascending("arrival_date"),
            environmental: OrderBy::ascending("date"),
            biological: OrderBy::ascending("date"),
            journal: OrderBy::descending("date"),
        }
    }
}

impl TryFrom<&crate::config::SourceConfig> for SourceOrdering {
    type Error = SourceError;

    fn try_from(config: &crate::config::SourceConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            locations: config.locations_order.parse()?,
            environmental: config.environmental_order.parse()?,
            biological: config.biological_order.parse()?,
            journal: config.journal_order.parse()?,
        })
    }
}

/// Backend holding the journey records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    async fn list_locations(&self, order: &OrderBy) -> Result<Vec<Location>, SourceError>;

    async fn list_environmental(
        &self,
        order: &OrderBy,
    ) -> Result<Vec<EnvironmentalData>, SourceError>;

    async fn list_biological(&self, order: &OrderBy) -> Result<Vec<BiologicalData>, SourceError>;

    async fn list_journal(&self, order: &OrderBy) -> Result<Vec<JournalEntry>, SourceError>;

    /// Store a new journal entry and return it with its assigned id.
    async fn create_journal_entry(
        &self,
        entry: NewJournalEntry,
    ) -> Result<JournalEntry, SourceError>;
}

/// Full in-memory copy of every collection for one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub locations: Vec<Location>,
    pub environmental: Vec<EnvironmentalData>,
    pub biological: Vec<BiologicalData>,
    pub journal: Vec<JournalEntry>,
}

impl Snapshot {
    /// Fetch all four collections concurrently.
    pub async fn load(
        source: &dyn RecordSource,
        ordering: &SourceOrdering,
    ) -> Result<Self, SourceError> {
        info!("Loading journey snapshot from {}", source.describe());

        let (locations, environmental, biological, journal) = futures::try_join!(
            source.list_locations(&ordering.locations),
            source.list_environmental(&ordering.environmental),
            source.list_biological(&ordering.biological),
            source.list_journal(&ordering.journal),
        )?;

        for location in &locations {
            if let Err(e) = location.validate() {
                warn!("Location {} looks inconsistent: {}", location.id, e);
            }
        }

        info!(
            "Loaded {} locations, {} environmental, {} biological, {} journal records",
            locations.len(),
            environmental.len(),
            biological.len(),
            journal.len()
        );

        Ok(Self {
            locations,
            environmental,
            biological,
            journal,
        })
    }

    /// Restrict the measurement collections to `scope`. Locations are kept
    /// whole so names still resolve.
    pub fn scoped(&self, scope: &Scope) -> Self {
        Self {
            locations: self.locations.clone(),
            environmental: filter_by_location(&self.environmental, scope),
            biological: filter_by_location(&self.biological, scope),
            journal: filter_by_location(&self.journal, scope),
        }
    }

    /// Total number of measurement and journal records.
    pub fn record_count(&self) -> usize {
        self.environmental.len() + self.biological.len() + self.journal.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// In-memory source that records which orderings it was asked for.
    struct FixedSource {
        snapshot: Snapshot,
        requested: Mutex<Vec<String>>,
        fail_journal: bool,
    }

    impl FixedSource {
        fn new(snapshot: Snapshot, fail_journal: bool) -> Self {
            Self {
                snapshot,
                requested: Mutex::new(Vec::new()),
                fail_journal,
            }
        }
    }

    #[async_trait]
    impl RecordSource for FixedSource {
        fn describe(&self) -> String {
            "fixed".to_string()
        }

        async fn list_locations(&self, order: &OrderBy) -> Result<Vec<Location>, SourceError> {
            self.requested.lock().unwrap().push(format!("locations:{}", order));
            Ok(self.snapshot.locations.clone())
        }

        async fn list_environmental(
            &self,
            order: &OrderBy,
        ) -> Result<Vec<EnvironmentalData>, SourceError> {
            self.requested.lock().unwrap().push(format!("environmental:{}", order));
            Ok(self.snapshot.environmental.clone())
        }

        async fn list_biological(
            &self,
            order: &OrderBy,
        ) -> Result<Vec<BiologicalData>, SourceError> {
            self.requested.lock().unwrap().push(format!("biological:{}", order));
            Ok(self.snapshot.biological.clone())
        }

        async fn list_journal(&self, order: &OrderBy) -> Result<Vec<JournalEntry>, SourceError> {
            self.requested.lock().unwrap().push(format!("journal:{}", order));
            if self.fail_journal {
                return Err(SourceError::InvalidOrder(order.to_string()));
            }
            Ok(self.snapshot.journal.clone())
        }

        async fn create_journal_entry(
            &self,
            entry: NewJournalEntry,
        ) -> Result<JournalEntry, SourceError> {
            Ok(JournalEntry::from_draft("fixed-1".to_string(), entry))
        }
    }

    fn reading(id: &str, location_id: &str) -> EnvironmentalData {
        EnvironmentalData {
            id: id.to_string(),
            location_id: Some(location_id.to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            temperature_avg: Some(18.0),
            temperature_min: None,
            temperature_max: None,
            humidity: None,
            light_exposure: None,
            air_quality_index: None,
            noise_level: None,
            weather_condition: None,
        }
    }

    #[test]
    fn test_order_by_parsing() {
        let order: OrderBy = "-date".parse().unwrap();
        assert_eq!(order, OrderBy::descending("date"));
        assert_eq!(order.to_string(), "-date");

        let order: OrderBy = "arrival_date".parse().unwrap();
        assert_eq!(order, OrderBy::ascending("arrival_date"));

        assert!("-".parse::<OrderBy>().is_err());
        assert!("date; drop".parse::<OrderBy>().is_err());
    }

    #[test]
    fn test_default_ordering() {
        let ordering = SourceOrdering::default();
        assert_eq!(ordering.locations.to_string(), "arrival_date");
        assert_eq!(ordering.journal.to_string(), "-date");
    }

    #[test]
    fn test_snapshot_load_fails_when_any_collection_fails() {
        let source = FixedSource::new(Snapshot::default(), true);

        let result = tokio_test::block_on(Snapshot::load(&source, &SourceOrdering::default()));
        assert!(matches!(result, Err(SourceError::InvalidOrder(_))));
        assert!(source
            .requested
            .lock()
            .unwrap()
            .contains(&"journal:-date".to_string()));
    }

    fn location(id: &str, latitude: f64) -> Location {
        Location {
            id: id.to_string(),
            name: format!("City {}", id),
            country: "Portugal".to_string(),
            latitude,
            longitude: -9.0,
            arrival_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            departure_date: None,
            description: None,
            image_url: None,
        }
    }

    fn entry(id: &str) -> JournalEntry {
        JournalEntry {
            id: id.to_string(),
            location_id: Some("a".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            title: "First day".to_string(),
            content: String::new(),
            emotions: Vec::new(),
            mood_score: Some(7.0),
            highlight_moment: false,
            image_url: None,
            audio_url: None,
        }
    }

    #[test]
    fn test_snapshot_load_joins_every_collection() {
        let expected = Snapshot {
            // Latitude 120 fails validation but only warns.
            locations: vec![location("a", 38.7), location("b", 120.0)],
            environmental: vec![reading("1", "a"), reading("2", "b")],
            biological: Vec::new(),
            journal: vec![entry("j1")],
        };
        assert!(expected.locations[1].validate().is_err());

        let source = FixedSource::new(expected.clone(), false);
        let ordering = SourceOrdering {
            locations: OrderBy::descending("arrival_date"),
            environmental: OrderBy::ascending("date"),
            biological: OrderBy::ascending("id"),
            journal: OrderBy::descending("date"),
        };

        let snapshot = tokio_test::block_on(Snapshot::load(&source, &ordering)).unwrap();
        assert_eq!(snapshot, expected);
        assert_eq!(snapshot.record_count(), 3);

        let mut requested = source.requested.lock().unwrap().clone();
        requested.sort();
        assert_eq!(
            requested,
            vec![
                "biological:id".to_string(),
                "environmental:date".to_string(),
                "journal:-date".to_string(),
                "locations:-arrival_date".to_string(),
            ]
        );
    }

    #[test]
    fn test_snapshot_scoped() {
        let snapshot = Snapshot {
            locations: Vec::new(),
            environmental: vec![reading("1", "a"), reading("2", "b"), reading("3", "a")],
            biological: Vec::new(),
            journal: Vec::new(),
        };

        let scoped = snapshot.scoped(&Scope::Location("a".to_string()));
        assert_eq!(scoped.environmental.len(), 2);
        assert_eq!(scoped.record_count(), 2);
        assert_eq!(snapshot.scoped(&Scope::All), snapshot);
    }
}
