//! Tavily web search backend.

use super::{SearchDocument, SearchProvider, SearchResults};
use crate::config::{resolve_key, SearchSettings, MAX_SEARCH_RESULTS};
use crate::error::{Result, VeritasError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyItem>,
}

#[derive(Debug, Deserialize)]
struct TavilyItem {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

impl From<TavilyItem> for SearchDocument {
    fn from(item: TavilyItem) -> Self {
        Self {
            url: item.url,
            title: item.title.filter(|t| !t.is_empty()),
            content: item.content.filter(|c| !c.is_empty()),
            score: item.score,
        }
    }
}

/// Tavily search client.
pub struct TavilySearch {
    http: Client,
    api_base: String,
    api_key: String,
    search_depth: String,
}

impl TavilySearch {
    pub fn new(api_base: &str, api_key: &str, search_depth: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VeritasError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            search_depth: search_depth.to_string(),
        })
    }

    pub fn from_settings(settings: &SearchSettings) -> Result<Self> {
        let api_key = resolve_key(settings.api_key.as_deref(), &settings.api_key_env)?;
        Self::new(
            &settings.api_base,
            &api_key,
            &settings.search_depth,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn parse_response(query: &str, body: &str) -> Result<SearchResults> {
        let response: TavilyResponse = serde_json::from_str(body).map_err(|e| {
            VeritasError::SearchUnavailable(format!("malformed search response: {}", e))
        })?;
        let documents = response.results.into_iter().map(SearchDocument::from).collect();
        Ok(SearchResults::new(query, documents))
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    #[instrument(skip(self), fields(provider = "tavily"))]
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults> {
        let max_results = max_results.clamp(1, MAX_SEARCH_RESULTS);

        let response = self
            .http
            .post(format!("{}/search", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "query": query,
                "max_results": max_results,
                "search_depth": self.search_depth,
            }))
            .send()
            .await
            .map_err(|e| VeritasError::SearchUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Search provider rate limited the request");
            return Err(VeritasError::SearchUnavailable("rate limited".to_string()));
        }
        if !status.is_success() {
            return Err(VeritasError::SearchUnavailable(format!(
                "upstream returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VeritasError::SearchUnavailable(format!("failed to read body: {}", e)))?;

        let results = Self::parse_response(query, &body)?;
        debug!("Search returned {} result(s)", results.len());
        Ok(results)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubServer;

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "query": "shelters",
            "results": [
                {"url": "https://www.redcross.org/shelter-status", "title": "Shelter status", "content": "Open", "score": 0.92},
                {"url": "https://city.gov/alerts", "title": "", "content": "Alerts"}
            ]
        }"#;

        let results = TavilySearch::parse_response("shelters", body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.results[0].title.as_deref(), Some("Shelter status"));
        assert_eq!(results.results[1].title, None);
        assert_eq!(results.query, "shelters");
    }

    #[test]
    fn test_parse_response_caps_results() {
        let items: Vec<_> = (0..6)
            .map(|i| serde_json::json!({"url": format!("https://news.example/{}", i)}))
            .collect();
        let body = serde_json::json!({ "results": items }).to_string();

        let results = TavilySearch::parse_response("q", &body).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_malformed_response_is_search_unavailable() {
        let err = TavilySearch::parse_response("q", "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind(), "search_unavailable");

        let err = TavilySearch::parse_response("q", r#"{"results": [{"title": "no url"}]}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "search_unavailable");
    }

    #[tokio::test]
    async fn test_error_status_is_search_unavailable_without_retry() {
        let server = StubServer::start(vec![
            (429, serde_json::json!({"detail": {"error": "rate limit"}})),
            (500, serde_json::json!({"detail": {"error": "internal"}})),
        ])
        .await;
        let search =
            TavilySearch::new(&server.base_url, "test-key", "basic", Duration::from_secs(5)).unwrap();

        let err = search.search("flood", 3).await.unwrap_err();
        assert!(matches!(err, VeritasError::SearchUnavailable(ref msg) if msg == "rate limited"));
        assert_eq!(server.hits(), 1);

        let err = search.search("flood", 3).await.unwrap_err();
        assert!(matches!(err, VeritasError::SearchUnavailable(ref msg) if msg.contains("500")));
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn test_success_status_is_parsed() {
        let server = StubServer::start(vec![(
            200,
            serde_json::json!({"results": [{"url": "https://weather.gov/alerts", "title": "Alerts"}]}),
        )])
        .await;
        let search =
            TavilySearch::new(&server.base_url, "test-key", "basic", Duration::from_secs(5)).unwrap();

        let results = search.search("flood", 3).await.unwrap();
        assert_eq!(results.urls().collect::<Vec<_>>(), vec!["https://weather.gov/alerts"]);
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_search_unavailable() {
        let search = TavilySearch::new(
            "http://127.0.0.1:9",
            "test-key",
            "basic",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = search.search("anything", 3).await.unwrap_err();
        assert!(matches!(err, VeritasError::SearchUnavailable(_)));
    }
}
