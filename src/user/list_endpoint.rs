//! Defines the endpoint for listing registered users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    user::{User, list_users},
};

/// The state needed to list users.
#[derive(Debug, Clone)]
pub struct ListUsersState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListUsersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with every registered user, without password hashes.
pub async fn list_users_endpoint(
    State(state): State<ListUsersState>,
) -> Result<Json<Vec<User>>, Error> {
    list_users(&*lock_connection(&state.db_connection)?).map(Json)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::test_utils::{get_test_server_and_state, sign_up};

    #[tokio::test]
    async fn lists_users_without_password_hashes() {
        let (server, _) = get_test_server_and_state();
        let alice = sign_up(&server, "Alice", "a@x.com", "hunter2").await;
        let bob = sign_up(&server, "Bob", "b@x.com", "hunter3").await;

        let response = server.get("/users").await;

        response.assert_status_ok();
        let users = response.json::<Vec<Value>>();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["id"], alice.as_i64());
        assert_eq!(users[0]["email"], "a@x.com");
        assert_eq!(users[0]["budget"], Value::Null);
        assert_eq!(users[1]["id"], bob.as_i64());
        assert!(users.iter().all(|user| user.get("passwordHash").is_none()));
    }
}
