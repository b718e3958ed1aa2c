//! Gemini API insight client
//!
//! Requests a short natural-language account summary for one client record
//! from the Gemini `generateContent` endpoint.
//!
//! The client is constructed in disabled mode when no API key is
//! configured; it then answers every request with a placeholder narrative
//! instead of failing, so the rest of the service behaves identically with
//! and without a key.

use async_trait::async_trait;
use nexus_common::db::models::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{InsightProvider, ProviderError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.0-flash";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Narrative returned when no API key is configured
const DISABLED_NARRATIVE: &str =
    "AI insights are not configured. Set an API key to enable account summaries.";

/// Narrative returned when the provider answers with no usable text
const EMPTY_NARRATIVE: &str = "No insight is available for this client yet.";

// ============================================================================
// Wire types (request)
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

// ============================================================================
// Wire types (response)
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini-backed insight provider
pub struct GeminiInsightClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiInsightClient {
    /// Create a new client; `api_key = None` yields a disabled client
    pub fn new(api_key: Option<String>) -> Result<Self, ProviderError> {
        if api_key.is_none() {
            info!("No Gemini API key configured; insight requests return a placeholder");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            endpoint: format!("{}/models/{}:generateContent", GEMINI_BASE_URL, GEMINI_MODEL),
        })
    }

    /// Override the endpoint (test hook)
    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Build the analysis prompt from the record's fields
    fn build_prompt(client: &Client) -> String {
        format!(
            "You are a CRM account analyst. Write a concise summary (3 short \
             paragraphs, plain text) of this client relationship and suggest \
             one next step.\n\
             Name: {}\n\
             Company: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Status: {}\n\
             Client since: {}\n\
             Notes: {}",
            client.name,
            client.company,
            client.email,
            client.phone,
            client.status.as_str(),
            client.created_at.format("%Y-%m-%d"),
            if client.notes.is_empty() { "(none)" } else { &client.notes },
        )
    }

    /// Pull the first candidate's text out of a response
    fn extract_narrative(response: GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| {
                let text: String = content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n");
                if text.trim().is_empty() {
                    None
                } else {
                    Some(text)
                }
            })
    }
}

#[async_trait]
impl InsightProvider for GeminiInsightClient {
    async fn summarize(&self, client: &Client) -> Result<String, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Ok(DISABLED_NARRATIVE.to_string());
        };

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(client),
                }],
            }],
        };

        debug!(client_id = %client.id, "Requesting Gemini insight");

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        // A well-formed response with no usable text is a soft failure
        Ok(Self::extract_narrative(body).unwrap_or_else(|| EMPTY_NARRATIVE.to_string()))
    }
}
