//! Derived views over the authoritative client collection
//!
//! Pure functions of (collection, search term). Both views are recomputed
//! from the full snapshot on every call; nothing here carries incremental
//! state, so a wholesale collection replacement can never cause drift.

use nexus_common::db::models::{Client, ClientStatus, CrmStats};

/// Maximum value of the recent-activity statistic
///
/// The figure is capped at 3 and has no time-window semantics.
const RECENT_ACTIVITY_CAP: usize = 3;

/// Filter the collection by a case-insensitive substring match on
/// name, company, or email
///
/// An empty term matches everything. Order of the input is preserved.
pub fn filtered(clients: &[Client], term: &str) -> Vec<Client> {
    if term.is_empty() {
        return clients.to_vec();
    }

    let needle = term.to_lowercase();
    clients
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.company.to_lowercase().contains(&needle)
                || c.email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Compute aggregate statistics from the collection
pub fn stats(clients: &[Client]) -> CrmStats {
    CrmStats {
        total_clients: clients.len(),
        active_clients: clients
            .iter()
            .filter(|c| c.status == ClientStatus::Active)
            .count(),
        prospects: clients
            .iter()
            .filter(|c| c.status == ClientStatus::Prospect)
            .count(),
        recent_activity: clients.len().min(RECENT_ACTIVITY_CAP),
    }
}
