//! Insight session coordination
//!
//! Manages the one-at-a-time request/response cycle for enrichment.
//! Selection is fire-and-forget: the provider call runs on a spawned task
//! and the caller returns immediately. Each selection stamps a new
//! generation; a response is applied only if its generation still matches
//! the session's, so the last selection always wins over a slow earlier
//! response. Cancellation is semantic only — in-flight network work is not
//! aborted, its result is discarded.

use std::sync::Arc;

use nexus_common::db::models::Client;
use nexus_common::events::{EventBus, NexusEvent};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{InsightProvider, InsightSession};

/// Internal session state
///
/// `loading == true` implies `narrative == None`: selecting a target clears
/// any previous narrative before the provider call starts.
#[derive(Default)]
struct SessionState {
    target: Option<Client>,
    narrative: Option<String>,
    loading: bool,
    generation: u64,
}

/// Coordinates the single-flight insight request cycle
pub struct InsightCoordinator {
    provider: Arc<dyn InsightProvider>,
    events: Arc<EventBus>,
    session: Arc<RwLock<SessionState>>,
}

impl InsightCoordinator {
    pub fn new(provider: Arc<dyn InsightProvider>, events: Arc<EventBus>) -> Self {
        Self {
            provider,
            events,
            session: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    /// Select a record for enrichment
    ///
    /// Clears any previous narrative, marks the session loading, and fires
    /// the provider request on a background task. The UI is never blocked
    /// on the provider.
    pub async fn select(&self, client: Client) {
        let generation = {
            let mut session = self.session.write().await;
            session.generation += 1;
            session.target = Some(client.clone());
            session.narrative = None;
            session.loading = true;
            session.generation
        };
        self.emit_state().await;

        let provider = Arc::clone(&self.provider);
        let session = Arc::clone(&self.session);
        let events = Arc::clone(&self.events);
        tokio::spawn(async move {
            let narrative = match provider.summarize(&client).await {
                Ok(text) => text,
                Err(e) => {
                    // Hard failure still resolves the session: empty
                    // narrative instead of a session stuck in loading
                    warn!(client_id = %client.id, "Insight request failed: {}", e);
                    String::new()
                }
            };
            apply_response(&session, &events, generation, narrative).await;
        });
    }

    /// Reset the session to idle
    ///
    /// Bumping the generation invalidates any in-flight provider response.
    pub async fn clear(&self) {
        {
            let mut session = self.session.write().await;
            session.generation += 1;
            session.target = None;
            session.narrative = None;
            session.loading = false;
        }
        self.emit_state().await;
    }

    /// Clear the session only if `id` is the current target
    ///
    /// Used when a record is deleted while selected.
    pub async fn clear_if_target(&self, id: Uuid) {
        let is_target = {
            let session = self.session.read().await;
            session.target.as_ref().map(|c| c.id) == Some(id)
        };
        if is_target {
            self.clear().await;
        }
    }

    /// Current session snapshot
    pub async fn snapshot(&self) -> InsightSession {
        let session = self.session.read().await;
        InsightSession {
            target: session.target.clone(),
            narrative: session.narrative.clone(),
            loading: session.loading,
        }
    }

    async fn emit_state(&self) {
        emit_state(&self.session, &self.events).await;
    }
}

/// Apply a provider response if the session still targets the record that
/// was selected when the request was fired
async fn apply_response(
    session: &RwLock<SessionState>,
    events: &EventBus,
    generation: u64,
    narrative: String,
) {
    let applied = {
        let mut session = session.write().await;
        if session.generation != generation {
            false
        } else {
            session.narrative = Some(narrative);
            session.loading = false;
            true
        }
    };

    if applied {
        emit_state(session, events).await;
    } else {
        debug!("Discarded stale insight response (generation {})", generation);
    }
}

async fn emit_state(session: &RwLock<SessionState>, events: &EventBus) {
    let session = session.read().await;
    events.emit_lossy(NexusEvent::insight_changed(
        session.target.as_ref().map(|c| c.id),
        session.loading,
        session.narrative.is_some(),
    ));
}
