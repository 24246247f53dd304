//! Cast indexing API client (Neynar)
//!
//! Resolves a normalized cast URL into the API's cast document. The
//! document is returned mostly raw; image extraction and quote merging
//! live in the service layer.

use std::sync::Arc;
use std::time::Instant;

use axum::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::metrics::{UPSTREAM_REQUEST_DURATION_SECONDS, UPSTREAM_REQUESTS_TOTAL};

/// Cast document as returned by the indexing API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCast {
    pub hash: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub embeds: Vec<Value>,
    pub author: ApiAuthor,
    /// The cast this one quotes, when the API inlines it
    #[serde(default)]
    pub parent_cast: Option<Box<ApiCast>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAuthor {
    pub fid: u64,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CastLookupResponse {
    cast: Option<ApiCast>,
}

impl ApiCast {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// The quoted cast: `parent_cast` when present, otherwise the first
    /// embed entry carrying a nested `cast` document.
    pub fn quoted_cast(&self) -> Option<ApiCast> {
        if let Some(parent) = &self.parent_cast {
            return Some((**parent).clone());
        }

        self.embeds
            .iter()
            .filter_map(|embed| embed.get("cast"))
            .find_map(|cast| serde_json::from_value(cast.clone()).ok())
    }
}

/// Lookup of a cast by URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CastLookup: Send + Sync {
    /// # Errors
    /// `CastNotFound` when the API has no such cast, `Upstream` on
    /// transport or decoding failure.
    async fn cast_by_url(&self, url: &str) -> Result<ApiCast, AppError>;
}

/// HTTP client for the Neynar v2 API
#[derive(Clone)]
pub struct NeynarClient {
    http_client: Arc<reqwest::Client>,
    base_url: String,
    api_key: String,
}

impl NeynarClient {
    pub fn new(http_client: Arc<reqwest::Client>, base_url: &str, api_key: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl CastLookup for NeynarClient {
    async fn cast_by_url(&self, url: &str) -> Result<ApiCast, AppError> {
        let endpoint = format!("{}/v2/farcaster/cast", self.base_url);
        let timer = UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&["neynar"])
            .start_timer();
        let started = Instant::now();

        let result = self
            .http_client
            .get(&endpoint)
            .query(&[("identifier", url), ("type", "url")])
            .header("accept", "application/json")
            .header("x-api-key", &self.api_key)
            .send()
            .await;
        timer.observe_duration();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&["neynar", "transport_error"])
                    .inc();
                tracing::warn!(error = %e, "Cast lookup request failed");
                return Err(AppError::Upstream(format!("cast lookup failed: {e}")));
            }
        };

        let status = response.status();
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&["neynar", status.as_str()])
            .inc();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                %status,
                %url,
                body = %truncate(&body, 200),
                "Indexing API returned no cast"
            );
            return Err(AppError::CastNotFound);
        }

        let payload: CastLookupResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Undecodable cast lookup response");
            AppError::Upstream(format!("cast lookup decode failed: {e}"))
        })?;

        let cast = payload.cast.ok_or(AppError::CastNotFound)?;
        tracing::debug!(
            hash = %cast.hash,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cast resolved"
        );
        Ok(cast)
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
