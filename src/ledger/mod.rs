//! Per-user, per-category spending with budget ceilings.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod core;
mod delete_endpoint;
mod list_endpoint;
mod record_endpoint;

pub use core::{
    DEFAULT_CATEGORY_BUDGET, EntryId, LedgerEntry, RecordOutcome, create_ledger_entry_table,
    delete_entry, get_entry, list_for_user, record_spend,
};
pub(crate) use core::delete_all_for_user;
pub use delete_endpoint::delete_entry_endpoint;
pub use list_endpoint::list_entries_endpoint;
pub use record_endpoint::record_spend_endpoint;

/// The state needed by the ledger endpoints.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The database connection for managing ledger entries.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
