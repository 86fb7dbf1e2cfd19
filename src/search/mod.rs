//! Web search used to ground verifications.
//!
//! A [`SearchProvider`] makes exactly one upstream call per request and
//! returns at most [`MAX_SEARCH_RESULTS`] ranked documents. Failures surface
//! as [`VeritasError::SearchUnavailable`](crate::error::VeritasError) and are
//! never retried here.

mod tavily;

pub use tavily::TavilySearch;

use crate::config::{SearchSettings, MAX_SEARCH_RESULTS};
use crate::error::{Result, VeritasError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Extracted page content or snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchDocument {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            content: None,
            score: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Ranked results for one query, never longer than the per-call cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchDocument>,
}

impl SearchResults {
    /// Build results, keeping rank order and dropping anything past the cap.
    pub fn new(query: &str, mut documents: Vec<SearchDocument>) -> Self {
        documents.truncate(MAX_SEARCH_RESULTS);
        Self {
            query: query.to_string(),
            results: documents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|d| d.url.as_str())
    }
}

/// Trait for web search backends.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search returning up to `max_results` documents.
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults>;

    /// Provider name for logs and diagnostics.
    fn name(&self) -> &str;
}

/// Create the configured search provider.
pub fn create_provider(settings: &SearchSettings) -> Result<Arc<dyn SearchProvider>> {
    match settings.provider.to_lowercase().as_str() {
        "tavily" => Ok(Arc::new(TavilySearch::from_settings(settings)?)),
        other => Err(VeritasError::Config(format!(
            "Unknown search provider: {}",
            other
        ))),
    }
}
