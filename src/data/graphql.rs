//! GraphQL client for the hook stats backend
//!
//! Sends one static query and maps the response into a `Snapshot`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{HookInfo, Snapshot};

/// Query for per-network hook activity
pub const HOOK_STATS_QUERY: &str = "query HookStats {
  hookStats {
    network
    chainId
    hookCount
    poolCount
    swapCount
  }
}";

/// Errors that can occur when fetching hook stats
#[derive(Debug, Error)]
pub enum StatsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned HTTP status {0}")]
    Status(u16),

    /// Backend reported GraphQL errors
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<HookStatsData>,
    errors: Option<Vec<GraphQlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HookStatsData {
    hook_stats: Vec<HookInfo>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

/// Client for the hook stats GraphQL endpoint
#[derive(Debug, Clone)]
pub struct StatsClient {
    /// HTTP client for making requests
    http_client: Client,
    /// GraphQL endpoint URL
    endpoint: String,
}

impl StatsClient {
    /// Creates a new StatsClient for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Creates a new StatsClient with a custom HTTP client
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client: client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches the current hook stats snapshot from the backend
    ///
    /// # Returns
    /// * `Ok(Snapshot)` - Records in the order the backend returned them
    /// * `Err(StatsError)` - On transport failure, non-2xx status, GraphQL
    ///   errors or an unparseable body
    pub async fn fetch_hook_infos(&self) -> Result<Snapshot, StatsError> {
        tracing::debug!(endpoint = %self.endpoint, "fetching hook stats");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&GraphQlRequest {
                query: HOOK_STATS_QUERY,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

/// Parses a GraphQL response body into a snapshot
///
/// A non-empty `errors` array wins over any partial `data`.
pub fn parse_response(body: &str) -> Result<Snapshot, StatsError> {
    let response: GraphQlResponse =
        serde_json::from_str(body).map_err(|e| StatsError::ParseError(e.to_string()))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(StatsError::GraphQl(messages.join("; ")));
    }

    response
        .data
        .map(|data| data.hook_stats)
        .ok_or_else(|| StatsError::ParseError("response has no data".to_string()))
}
