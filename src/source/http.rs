//! Record source backed by a REST entities API.
//!
//! Collections are read with `GET {api_url}/entities/{Entity}?sort={key}`
//! and journal entries are created with `POST {api_url}/entities/JournalEntry`.

use super::{Collection, OrderBy, RecordSource, SourceError};
use crate::models::{
    BiologicalData, EnvironmentalData, JournalEntry, Location, NewJournalEntry,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP record source.
pub struct HttpSource {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpSource {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http_client,
        })
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/entities/{}", self.base_url, collection.entity_name())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn check(
        collection: Collection,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SourceError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(SourceError::Status {
            collection: collection.entity_name(),
            status,
            body,
        })
    }

    async fn list<T: DeserializeOwned>(
        &self,
        collection: Collection,
        order: &OrderBy,
    ) -> Result<Vec<T>, SourceError> {
        let url = self.collection_url(collection);
        debug!("GET {} sort={}", url, order);

        let request = self
            .http_client
            .get(&url)
            .query(&[("sort", order.to_string())]);
        let response = self.authorize(request).send().await?;
        let response = Self::check(collection, response).await?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    fn describe(&self) -> String {
        format!("API {}", self.base_url)
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

        let url = self.collection_url(Collection::JournalEntry);
        debug!("POST {}", url);

        let request = self.http_client.post(&url).json(&entry);
        let response = self.authorize(request).send().await?;
        let response = Self::check(Collection::JournalEntry, response).await?;

        let created: JournalEntry = response.json().await?;
        info!("Created journal entry {} via {}", created.id, self.base_url);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_urls() {
        let source = HttpSource::new("https://journey.example.com/api/", None, 30).unwrap();

        assert_eq!(
            source.collection_url(Collection::Location),
            "https://journey.example.com/api/entities/Location"
        );
        assert_eq!(
            source.collection_url(Collection::BiologicalData),
            "https://journey.example.com/api/entities/BiologicalData"
        );
        assert_eq!(source.describe(), "API https://journey.example.com/api");
    }

    #[test]
    fn test_create_validates_before_sending() {
        let source = HttpSource::new("http://127.0.0.1:9", None, 1).unwrap();
        let draft = NewJournalEntry {
            location_id: None,
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            title: String::new(),
            content: String::new(),
            emotions: Vec::new(),
            mood_score: 5,
            highlight_moment: false,
            image_url: None,
            audio_url: None,
        };

        let result = tokio_test::block_on(source.create_journal_entry(draft));
        assert!(matches!(result, Err(SourceError::InvalidEntry(_))));
    }
}
