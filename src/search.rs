//! Web search stage.
//!
//! One GET against a Custom Search style endpoint per request. No retry, no
//! pagination, no caching.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::MAX_RESULT_COUNT;
use crate::data_models::SearchResult;
use crate::error::SearchError;

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// An empty vector is a successful search with no hits, distinct from `Err`.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    items: Vec<SearchResult>,
}

pub struct GoogleSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    engine_id: String,
    result_count: usize,
}

impl GoogleSearchClient {
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: &str,
        engine_id: &str,
        result_count: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            result_count: result_count.clamp(1, MAX_RESULT_COUNT),
        }
    }

    /// Parses a success body. Missing `items` means zero results.
    pub fn parse_body(body: &str) -> Result<Vec<SearchResult>, SearchError> {
        let parsed: SearchResponseBody =
            serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(parsed.items)
    }
}

#[async_trait]
impl SearchBackend for GoogleSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let num = self.result_count.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(SearchError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SearchError::Transport)?;
        if !status.is_success() {
            return Err(SearchError::Status { status, body });
        }

        let mut items = Self::parse_body(&body)?;
        items.truncate(self.result_count);
        log::info!("search returned {} items for {:?}", items.len(), query);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_items() {
        let body = r#"{
            "kind": "customsearch#search",
            "items": [
                {"title": "MARCOS", "link": "https://indiannavy.nic.in/marcos", "snippet": "Marine commandos."},
                {"title": "No snippet", "link": "https://example.com"}
            ]
        }"#;
        let items = GoogleSearchClient::parse_body(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "MARCOS");
        assert_eq!(items[0].snippet, "Marine commandos.");
        assert_eq!(items[1].snippet, "");
    }

    #[test]
    fn test_missing_items_is_empty_success() {
        let items = GoogleSearchClient::parse_body(r#"{"kind": "customsearch#search"}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let err = GoogleSearchClient::parse_body("<html>quota</html>").unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }
}
