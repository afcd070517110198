//! Defines the endpoint for joining an existing group.

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
    extract::JsonBody,
    group::{GroupForm, add_member, get_group_by_name, verify_group_password},
};

/// The state needed to join a group.
#[derive(Debug, Clone)]
pub struct JoinGroupState {
    /// The database connection for managing groups.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for JoinGroupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for joining a group as the member in `groupMembers`.
///
/// Follows the same steps as [join_group](crate::group::join_group), but the database lock is
/// released while the group password is verified.
///
/// # Errors
///
/// - The group does not exist.
/// - The group password is wrong.
/// - The member is already in the group, or its identity is used by another group.
pub async fn join_group_endpoint(
    State(state): State<JoinGroupState>,
    JsonBody(form): JsonBody<GroupForm>,
) -> Result<Json<Value>, Error> {
    let group = get_group_by_name(&form.group_name, &*lock_connection(&state.db_connection)?)?;

    verify_group_password(&group, &form.group_password)?;

    let member_set = add_member(
        group.id,
        &form.member_identity(),
        &*lock_connection(&state.db_connection)?,
    )?;

    Ok(Json(json!({
        "message": format!("Joined group {}", group.name),
        "memberSet": member_set,
    })))
}
