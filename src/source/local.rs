//! Record source backed by JSON files in a directory.
//!
//! Each collection lives in its own file holding a JSON array
//! (`locations.json`, `environmental_data.json`, `biological_data.json`,
//! `journal_entries.json`). A missing file is an empty collection.

use super::{Collection, OrderBy, RecordSource, SourceError};
use crate::models::{
    BiologicalData, EnvironmentalData, JournalEntry, Location, NewJournalEntry,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// JSON-directory record source.
pub struct LocalSource {
    data_dir: PathBuf,
    /// Serializes journal writes so concurrent creates do not clobber each other.
    write_lock: Mutex<()>,
}

impl LocalSource {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    async fn read_collection<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, SourceError> {
        let path = self.path_for(collection);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, treating as empty", path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(SourceError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| SourceError::Parse {
            what: path.display().to_string(),
            source: e,
        })
    }

    async fn list<T>(&self, collection: Collection, order: &OrderBy) -> Result<Vec<T>, SourceError>
    where
        T: DeserializeOwned + Serialize,
    {
        let records = self.read_collection(collection).await?;
        let sorted = sort_records(records, order)?;
        debug!(
            "Read {} {} records ordered by {}",
            sorted.len(),
            collection.entity_name(),
            order
        );
        Ok(sorted)
    }
}

/// Stable sort by a top-level field of the serialized record.
///
/// Records missing the field sort before those that have it.
fn sort_records<T: Serialize>(records: Vec<T>, order: &OrderBy) -> Result<Vec<T>, SourceError> {
    let mut keyed = Vec::with_capacity(records.len());
    for record in records {
        let value = serde_json::to_value(&record).map_err(|e| SourceError::Parse {
            what: format!("sort key '{}'", order.key),
            source: e,
        })?;
        let key = value.get(&order.key).cloned().unwrap_or(Value::Null);
        keyed.push((key, record));
    }

    if order.descending {
        keyed.sort_by(|(a, _), (b, _)| compare_values(b, a));
    } else {
        keyed.sort_by(|(a, _), (b, _)| compare_values(a, b));
    }

    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl RecordSource for LocalSource {
    fn describe(&self) -> String {
        format!("local directory {}", self.data_dir.display())
    }

    async fn list_locations(&self, order: &OrderBy) -> Result<Vec<Location>, SourceError> {
        self.list(Collection::Location, order).await
    }

    async fn list_environmental(
        &self,
        order: &OrderBy,
    ) -> Result<Vec<EnvironmentalData>, SourceError> {
        self.list(Collection::EnvironmentalData, order).await
    }

    async fn list_biological(&self, order: &OrderBy) -> Result<Vec<BiologicalData>, SourceError> {
        self.list(Collection::BiologicalData, order).await
    }

    async fn list_journal(&self, order: &OrderBy) -> Result<Vec<JournalEntry>, SourceError> {
        self.list(Collection::JournalEntry, order).await
    }

    async fn create_journal_entry(
        &self,
        entry: NewJournalEntry,
    ) -> Result<JournalEntry, SourceError> {
        entry.validate().map_err(SourceError::InvalidEntry)?;

        let _guard = self.write_lock.lock().await;

        let mut entries: Vec<JournalEntry> =
            self.read_collection(Collection::JournalEntry).await?;

        let mut n = entries.len() + 1;
        let id = loop {
            let candidate = format!("entry-{}", n);
            if !entries.iter().any(|e| e.id == candidate) {
                break candidate;
            }
            n += 1;
        };

        let created = JournalEntry::from_draft(id, entry);
        entries.push(created.clone());

        let path = self.path_for(Collection::JournalEntry);
        let json = serde_json::to_string_pretty(&entries).map_err(|e| SourceError::Parse {
            what: path.display().to_string(),
            source: e,
        })?;

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| SourceError::Io {
                path: self.data_dir.display().to_string(),
                source: e,
            })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| SourceError::Io {
                path: path.display().to_string(),
                source: e,
            })?;

        info!("Created journal entry {} in {}", created.id, path.display());
        Ok(created)
    }
}
