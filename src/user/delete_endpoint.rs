//! Defines the endpoint for deleting a user and their ledger.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    extract::PathParams,
    user::{UserID, delete_user},
};

/// The state needed to delete a user.
#[derive(Debug, Clone)]
pub struct DeleteUserState {
    /// The database connection for managing users.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a user and all of their ledger entries.
pub async fn delete_user_endpoint(
    State(state): State<DeleteUserState>,
    PathParams(user_id): PathParams<i64>,
) -> Result<Json<Value>, Error> {
    let user_id = UserID::new(user_id);

    delete_user(user_id, &*lock_connection(&state.db_connection)?).inspect_err(|error| {
        tracing::debug!("Could not delete user {user_id}: {error}");
    })?;

    Ok(Json(json!({ "message": "Deleted successfully" })))
}
