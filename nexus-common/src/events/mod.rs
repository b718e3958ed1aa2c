//! Event types for the Nexus event system
//!
//! Provides the shared event definitions and EventBus used to notify the UI
//! (via SSE) when engine state changes, instead of having consumers poll.

use crate::db::models::Connectivity;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Nexus event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// All state-change notifications use this central enum so subscribers can
/// match exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NexusEvent {
    /// The authoritative client collection was replaced after a reload
    ///
    /// Triggers:
    /// - SSE: Refresh client table and statistics cards
    ClientsChanged {
        /// Size of the collection after the reload
        total: usize,
        /// When the collection changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Connectivity with the record store flipped (online ↔ offline)
    ///
    /// Triggers:
    /// - SSE: Update status badge, enable/disable mutation controls
    ConnectivityChanged {
        /// Connectivity after the change
        connectivity: Connectivity,
        /// When connectivity changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The insight session changed (selection, response, or clear)
    ///
    /// Triggers:
    /// - SSE: Refresh the insight panel
    InsightChanged {
        /// Currently targeted client (None after a clear)
        target_id: Option<Uuid>,
        /// Whether a provider request is in flight
        loading: bool,
        /// Whether a narrative is available
        has_narrative: bool,
        /// When the session changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl NexusEvent {
    /// Event type string used as the SSE `event:` field
    pub fn type_str(&self) -> &'static str {
        match self {
            NexusEvent::ClientsChanged { .. } => "ClientsChanged",
            NexusEvent::ConnectivityChanged { .. } => "ConnectivityChanged",
            NexusEvent::InsightChanged { .. } => "InsightChanged",
        }
    }

    pub fn clients_changed(total: usize) -> Self {
        NexusEvent::ClientsChanged {
            total,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn connectivity_changed(connectivity: Connectivity) -> Self {
        NexusEvent::ConnectivityChanged {
            connectivity,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn insight_changed(target_id: Option<Uuid>, loading: bool, has_narrative: bool) -> Self {
        NexusEvent::InsightChanged {
            target_id,
            loading,
            has_narrative,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Broadcast bus for NexusEvent
///
/// One-to-many event distribution backed by `tokio::sync::broadcast`.
/// Subscribers that lag beyond the channel capacity lose the oldest events.
pub struct EventBus {
    tx: broadcast::Sender<NexusEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<NexusEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    pub fn emit(&self, event: NexusEvent) -> Result<usize, broadcast::error::SendError<NexusEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscribers case
    ///
    /// State-change notifications are advisory; a service with no connected
    /// UI has nobody to notify and that is not an error.
    pub fn emit_lossy(&self, event: NexusEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
