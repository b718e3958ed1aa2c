//! Client data synchronization engine
//!
//! Owns the authoritative in-memory client collection and reconciles it
//! with the record store. Every mutation is persisted first and then
//! followed by a full reload from the store — there is no optimistic local
//! patch. That trades an extra round trip per mutation for the invariant
//! the whole service leans on: the in-memory collection is never ahead of
//! the record store.
//!
//! Load failures are absorbed into connectivity state rather than
//! propagated; the service degrades to offline and keeps serving the
//! last-known collection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use nexus_common::db::models::{Client, ClientFields, Connectivity};
use nexus_common::events::{EventBus, NexusEvent};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::insight::InsightCoordinator;
use crate::store::{RecordStore, TransportError};

/// Synchronization engine
///
/// One instance per process; consumers receive it by injection rather than
/// through ambient globals. The collection lives behind an async RwLock
/// because axum may run handlers concurrently; within a single call a
/// mutation's reload is still sequenced strictly after the store
/// acknowledgment. Rapid overlapping mutations from different requests are
/// not serialized against each other.
pub struct SyncEngine {
    store: Arc<dyn RecordStore>,
    insight: Arc<InsightCoordinator>,
    events: Arc<EventBus>,
    clients: RwLock<Vec<Client>>,
    connectivity: RwLock<Connectivity>,
    loading: AtomicBool,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        insight: Arc<InsightCoordinator>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            insight,
            events,
            clients: RwLock::new(Vec::new()),
            connectivity: RwLock::new(Connectivity::Offline),
            loading: AtomicBool::new(false),
        }
    }

    /// Reload the authoritative collection from the record store
    ///
    /// On success the collection is replaced wholesale and connectivity
    /// goes online. On any failure the previous collection stays untouched
    /// and connectivity goes offline; the error is absorbed here and never
    /// reaches the caller. The loading flag is cleared on every path.
    pub async fn load(&self) {
        self.loading.store(true, Ordering::SeqCst);

        match self.store.list_all().await {
            Ok(list) => {
                let total = list.len();
                *self.clients.write().await = list;
                self.set_connectivity(Connectivity::Online).await;
                self.events.emit_lossy(NexusEvent::clients_changed(total));
            }
            Err(e) => {
                warn!("Reload from record store failed: {}", e);
                self.set_connectivity(Connectivity::Offline).await;
            }
        }

        self.loading.store(false, Ordering::SeqCst);
    }

    /// Create a new client record
    ///
    /// The identifier and creation timestamp are generated here, before the
    /// first persist. On success the collection is re-derived from the
    /// store; on failure nothing local changes.
    pub async fn create(&self, fields: ClientFields) -> Result<Uuid, TransportError> {
        let client = Client::from_fields(Uuid::new_v4(), Utc::now(), fields);
        let id = client.id;

        self.store.create(&client).await?;
        info!(client_id = %id, "Created client {:?}", client.name);

        self.load().await;
        Ok(id)
    }

    /// Replace the mutable fields of an existing record
    pub async fn update(&self, id: Uuid, fields: ClientFields) -> Result<(), TransportError> {
        self.store.update(id, &fields).await?;
        info!(client_id = %id, "Updated client");

        self.load().await;
        Ok(())
    }

    /// Delete a record
    ///
    /// If the deleted record was the insight target, the insight session is
    /// reset as well.
    pub async fn delete(&self, id: Uuid) -> Result<(), TransportError> {
        self.store.delete(id).await?;
        info!(client_id = %id, "Deleted client");

        self.load().await;
        self.insight.clear_if_target(id).await;
        Ok(())
    }

    /// Clone of the authoritative collection
    pub async fn snapshot(&self) -> Vec<Client> {
        self.clients.read().await.clone()
    }

    /// Look up one record in the authoritative collection
    pub async fn find(&self, id: Uuid) -> Option<Client> {
        self.clients.read().await.iter().find(|c| c.id == id).cloned()
    }

    /// Connectivity of the last load attempt
    pub async fn connectivity(&self) -> Connectivity {
        *self.connectivity.read().await
    }

    /// Whether a load is currently in progress
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    async fn set_connectivity(&self, new: Connectivity) {
        let mut current = self.connectivity.write().await;
        if *current != new {
            *current = new;
            self.events.emit_lossy(NexusEvent::connectivity_changed(new));
            info!("Record store connectivity: {:?}", new);
        }
    }
}
