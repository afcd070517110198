//! Defines the endpoint for listing every group.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    group::{Group, list_groups},
};

/// The state needed to list groups.
#[derive(Debug, Clone)]
pub struct ListGroupsState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListGroupsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with every group, unfiltered and unpaginated.
pub async fn list_groups_endpoint(
    State(state): State<ListGroupsState>,
) -> Result<Json<Vec<Group>>, Error> {
    list_groups(&*lock_connection(&state.db_connection)?).map(Json)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::test_utils::{create_group, get_test_server_and_state};

    #[tokio::test]
    async fn empty_list_is_ok() {
        let (server, _) = get_test_server_and_state();

        let response = server.get("/groups").await;

        response.assert_status_ok();
        assert!(response.json::<Vec<Value>>().is_empty());
    }

    #[tokio::test]
    async fn lists_every_group() {
        let (server, _) = get_test_server_and_state();
        create_group(&server, "flatmates", "letmein", "alice").await;
        create_group(&server, "colleagues", "letmein", "carol").await;

        let groups = server.get("/groups").await.json::<Vec<Value>>();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["groupName"], "flatmates");
        assert_eq!(groups[1]["groupName"], "colleagues");
    }
}
