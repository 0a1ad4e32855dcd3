//! Tavily web-search adapter with short-lived result caching.
//!
//! Search augments the chat widget with citable sources. Results are
//! display-only data, so identical queries within a few minutes are served
//! from cache and callers degrade gracefully when the provider is down.

use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::TavilyConfig;

/// Search endpoint.
const TAVILY_API_URL: &str = "https://api.tavily.com/search";

/// Per-request deadline; search must never stall the chat widget.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Cached result lifetime.
const CACHE_TTL: Duration = Duration::from_secs(300);

const CACHE_CAPACITY: u64 = 1000;

/// Errors that can occur during a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A single search hit handed to the chat augmentation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Tavily search client.
#[derive(Clone)]
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: SecretString,
    cache: Cache<String, Vec<SearchResult>>,
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TavilyClient {
    /// Create a new search client from injected configuration.
    #[must_use]
    pub fn new(config: &TavilyConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            cache,
        }
    }

    /// Run a basic-depth search, returning at most `max_results` hits.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, timeout, or an API error
    /// response.
    #[instrument(skip(self), fields(max_results))]
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let cache_key = format!("{max_results}:{query}");

        if let Some(results) = self.cache.get(&cache_key).await {
            debug!("cache hit for search");
            return Ok(results);
        }

        let response = self
            .client
            .post(TAVILY_API_URL)
            .timeout(SEARCH_TIMEOUT)
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({
                "query": query,
                "max_results": max_results,
                "include_answer": false,
                "search_depth": "basic",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(500)
                .collect();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        let results: Vec<SearchResult> = body
            .results
            .into_iter()
            .take(max_results)
            .map(SearchResult::from)
            .collect();

        debug!(count = results.len(), "search complete");
        self.cache.insert(cache_key, results.clone()).await;
        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

/// Wire shape of one hit; older responses carried `snippet`, newer ones
/// `content`.
#[derive(Debug, Deserialize)]
struct TavilyHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl From<TavilyHit> for SearchResult {
    fn from(hit: TavilyHit) -> Self {
        Self {
            title: hit.title,
            url: hit.url,
            snippet: hit.content.or(hit.snippet).unwrap_or_default(),
        }
    }
}
