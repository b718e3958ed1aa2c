//! AI insight enrichment
//!
//! One narrative summary per selected client record, requested from an
//! external text-generation provider. The coordinator owns the session
//! state; the provider is consumed only through the `InsightProvider`
//! trait.

use async_trait::async_trait;
use nexus_common::db::models::Client;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub mod coordinator;
pub mod gemini;

pub use coordinator::InsightCoordinator;
pub use gemini::GeminiInsightClient;

/// Insight provider errors (hard failures only)
///
/// Ordinary absence of data is not an error: providers return a placeholder
/// narrative instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Provider API returned an error response (rate limit, auth, server)
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the provider response
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Contract for requesting a natural-language summary for one record
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn summarize(&self, client: &Client) -> Result<String, ProviderError>;
}

/// Snapshot of the insight session, as exposed to the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSession {
    /// Currently targeted client (None when idle)
    pub target: Option<Client>,
    /// Narrative text, present once the provider has responded
    pub narrative: Option<String>,
    /// Whether a provider request is in flight for the current target
    pub loading: bool,
}

impl InsightSession {
    pub fn target_id(&self) -> Option<Uuid> {
        self.target.as_ref().map(|c| c.id)
    }
}
