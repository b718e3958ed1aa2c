//! Record store contract
//!
//! The synchronization engine consumes the persistence layer only through
//! the `RecordStore` trait; every failure surfaces as a `TransportError`,
//! never as a raw sqlx type.

use async_trait::async_trait;
use nexus_common::db::models::{Client, ClientFields};
use thiserror::Error;
use uuid::Uuid;

pub mod sqlite;

pub use sqlite::SqliteRecordStore;

/// Record store errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Store unreachable or it rejected the request
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// No record with the given identifier
    #[error("Client not found: {0}")]
    NotFound(Uuid),

    /// Stored data could not be decoded into a client record
    #[error("Malformed record data: {0}")]
    Malformed(String),
}

impl From<sqlx::Error> for TransportError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                TransportError::Malformed(e.to_string())
            }
            other => TransportError::Unavailable(other.to_string()),
        }
    }
}

/// CRUD contract over the client records table
///
/// `list_all` returns records ordered by creation time descending.
/// `update` and `delete` of an unknown id report `TransportError::NotFound`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Client>, TransportError>;

    async fn create(&self, client: &Client) -> Result<(), TransportError>;

    async fn update(&self, id: Uuid, fields: &ClientFields) -> Result<(), TransportError>;

    async fn delete(&self, id: Uuid) -> Result<(), TransportError>;
}
