//! HTTP API endpoints

mod clients;
mod health;
mod insight;
mod sse;
mod ui;

pub use clients::{
    create_client, delete_client, get_stats, list_clients, reload, update_client,
};
pub use health::{health_check, health_routes};
pub use insight::{clear_insight, get_insight, select_insight};
pub use sse::event_stream;
pub use ui::{serve_app_js, serve_index};
