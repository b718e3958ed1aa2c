//! SQLite-backed record store
//!
//! Persists client records in the `clients` table created by
//! `nexus_common::db::init`. Timestamps are written in a fixed-width
//! RFC 3339 form so the text column compares correctly for descending
//! retrieval.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nexus_common::db::models::{Client, ClientFields};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::{RecordStore, TransportError};

/// Raw row shape as read from the clients table
type ClientRow = (
    String, // id
    String, // name
    String, // email
    String, // phone
    String, // company
    String, // status
    String, // notes
    String, // created_at
);

/// SQLite implementation of the record store contract
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_client(row: ClientRow) -> Result<Client, TransportError> {
        let (id, name, email, phone, company, status, notes, created_at) = row;

        let id = Uuid::parse_str(&id)
            .map_err(|e| TransportError::Malformed(format!("bad client id {:?}: {}", id, e)))?;
        let status = status
            .parse()
            .map_err(|e: String| TransportError::Malformed(e))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| {
                TransportError::Malformed(format!("bad timestamp {:?}: {}", created_at, e))
            })?
            .with_timezone(&Utc);

        Ok(Client {
            id,
            name,
            email,
            phone,
            company,
            status,
            notes,
            created_at,
        })
    }

    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        // Fixed-width form keeps lexicographic and chronological order aligned
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn list_all(&self) -> Result<Vec<Client>, TransportError> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT id, name, email, phone, company, status, notes, created_at
             FROM clients ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} client rows", rows.len());

        rows.into_iter().map(Self::row_to_client).collect()
    }

    async fn create(&self, client: &Client) -> Result<(), TransportError> {
        sqlx::query(
            "INSERT INTO clients (id, name, email, phone, company, status, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(client.id.to_string())
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.company)
        .bind(client.status.as_str())
        .bind(&client.notes)
        .bind(Self::format_timestamp(&client.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, id: Uuid, fields: &ClientFields) -> Result<(), TransportError> {
        // id and created_at are never rewritten
        let result = sqlx::query(
            "UPDATE clients SET name = ?, email = ?, phone = ?, company = ?, status = ?, notes = ?
             WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.company)
        .bind(fields.status.as_str())
        .bind(&fields.notes)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TransportError::NotFound(id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), TransportError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TransportError::NotFound(id));
        }

        Ok(())
    }
}
