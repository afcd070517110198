//! Defines the endpoint for listing a user's ledger entries.

use axum::{Json, extract::State};

use crate::{
    Error,
    app_state::lock_connection,
    extract::PathParams,
    ledger::{LedgerEntry, LedgerState, list_for_user},
    user::UserID,
};

/// A route handler that responds with a user's ledger entries, oldest first.
pub async fn list_entries_endpoint(
    State(state): State<LedgerState>,
    PathParams(user_id): PathParams<i64>,
) -> Result<Json<Vec<LedgerEntry>>, Error> {
    list_for_user(
        UserID::new(user_id),
        &*lock_connection(&state.db_connection)?,
    )
    .map(Json)
}
