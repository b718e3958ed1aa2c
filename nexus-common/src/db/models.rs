//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    Active,
    Inactive,
    Prospect,
}

impl ClientStatus {
    /// Status as stored in the `clients.status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "Active",
            ClientStatus::Inactive => "Inactive",
            ClientStatus::Prospect => "Prospect",
        }
    }
}

impl std::str::FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(ClientStatus::Active),
            "Inactive" => Ok(ClientStatus::Inactive),
            "Prospect" => Ok(ClientStatus::Prospect),
            other => Err(format!("unknown client status: {}", other)),
        }
    }
}

/// A client record
///
/// `id` and `created_at` are immutable after creation; updates replace the
/// remaining fields wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub status: ClientStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Assemble a full record from its mutable fields plus a fresh identity
    pub fn from_fields(id: Uuid, created_at: DateTime<Utc>, fields: ClientFields) -> Self {
        Self {
            id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            company: fields.company,
            status: fields.status,
            notes: fields.notes,
            created_at,
        }
    }
}

/// The mutable subset of a client record
///
/// Used as the create payload and as the full-replacement update payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub status: ClientStatus,
    pub notes: String,
}

/// Whether the last synchronization attempt with the record store succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
}

/// Aggregate statistics derived from the authoritative client collection
///
/// `recent_activity` is capped at 3 regardless of true volume. The cap is
/// a deliberate approximation with no time-window semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmStats {
    pub total_clients: usize,
    pub active_clients: usize,
    pub prospects: usize,
    pub recent_activity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_column_round_trip() {
        for status in [
            ClientStatus::Active,
            ClientStatus::Inactive,
            ClientStatus::Prospect,
        ] {
            let parsed: ClientStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        let result = "Archived".parse::<ClientStatus>();
        assert!(result.is_err());
    }

    #[test]
    fn test_client_json_uses_camel_case() {
        let client = Client {
            id: Uuid::new_v4(),
            name: "Ana Silva".to_string(),
            email: "ana@acme.com".to_string(),
            phone: "+55 11 99999-0001".to_string(),
            company: "Acme Corp".to_string(),
            status: ClientStatus::Active,
            notes: String::new(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&client).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["status"], "Active");
    }

    #[test]
    fn test_stats_json_field_names() {
        let stats = CrmStats {
            total_clients: 3,
            active_clients: 2,
            prospects: 1,
            recent_activity: 3,
        };

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["totalClients"], 3);
        assert_eq!(json["activeClients"], 2);
        assert_eq!(json["prospects"], 1);
        assert_eq!(json["recentActivity"], 3);
    }

    #[test]
    fn test_connectivity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Connectivity::Online).unwrap(),
            serde_json::Value::String("online".to_string())
        );
        assert_eq!(
            serde_json::to_value(Connectivity::Offline).unwrap(),
            serde_json::Value::String("offline".to_string())
        );
    }
}
