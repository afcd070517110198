//! Defines the endpoint for creating a new group.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, PasswordHash,
    app_state::lock_connection,
    extract::JsonBody,
    group::{Group, GroupForm, create_group, group_name_exists},
};

/// The state needed to create a group.
#[derive(Debug, Clone)]
pub struct CreateGroupState {
    /// The database connection for managing groups.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for hashing the group password.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for CreateGroupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// A route handler for creating a group, responds with 201 Created and the new group.
///
/// `groupMembers` seeds the group's first member set. The name is checked before the password
/// is hashed, and the database lock is not held while hashing.
pub async fn create_group_endpoint(
    State(state): State<CreateGroupState>,
    JsonBody(form): JsonBody<GroupForm>,
) -> Result<(StatusCode, Json<Group>), Error> {
    if group_name_exists(&form.group_name, &*lock_connection(&state.db_connection)?)? {
        return Err(Error::DuplicateGroupName);
    }

    let password_hash = PasswordHash::new(&form.group_password, state.password_hash_cost)?;

    let group = create_group(
        &form.group_name,
        password_hash,
        &form.member_identity(),
        &*lock_connection(&state.db_connection)?,
    )?;

    Ok((StatusCode::CREATED, Json(group)))
}

#[cfg(test)]
mod create_group_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        AppState, build_router,
        group::list_groups,
        test_utils::{create_group, get_test_server_and_state},
    };

    #[tokio::test]
    async fn creates_group() {
        let (server, _) = get_test_server_and_state();

        let group = create_group(&server, "flatmates", "letmein", "alice").await;

        assert_eq!(group["groupName"], "flatmates");
        assert_eq!(group["groupMembers"].as_array().unwrap().len(), 1);
        assert!(group.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let (server, state) = get_test_server_and_state();
        create_group(&server, "flatmates", "letmein", "alice").await;

        let response = server
            .post("/create-group")
            .json(&json!({
                "groupName": "flatmates",
                "groupPassword": "different",
                "groupMembers": "bob",
            }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(
            response.json::<Value>()["message"],
            "Group name already taken"
        );
        assert_eq!(
            list_groups(&state.db_connection.lock().unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_before_hashing() {
        let (server, state) = get_test_server_and_state();
        create_group(&server, "flatmates", "letmein", "alice").await;
        // bcrypt rejects this cost, so hashing would surface as a 500.
        let unhashable_state = AppState {
            db_connection: state.db_connection.clone(),
            password_hash_cost: 99,
        };
        let server = TestServer::try_new(build_router(unhashable_state))
            .expect("Could not create test server.");

        server
            .post("/create-group")
            .json(&json!({
                "groupName": "flatmates",
                "groupPassword": "different",
                "groupMembers": "bob",
            }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}
