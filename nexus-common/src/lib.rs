//! # Nexus Common Library
//!
//! Shared code for the Nexus CRM service including:
//! - Database models (client records, derived statistics)
//! - Event types (NexusEvent enum) and the broadcast EventBus
//! - Configuration loading and root folder resolution
//! - Database initialization

pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
