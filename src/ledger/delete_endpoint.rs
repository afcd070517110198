//! Defines the endpoint for deleting a single ledger entry.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    Error,
    app_state::lock_connection,
    extract::PathParams,
    ledger::{EntryId, LedgerState, delete_entry},
    user::UserID,
};

/// A route handler for deleting one of a user's ledger entries.
///
/// The entry must belong to the user in the path, otherwise it is reported as not found.
pub async fn delete_entry_endpoint(
    State(state): State<LedgerState>,
    PathParams((user_id, entry_id)): PathParams<(i64, EntryId)>,
) -> Result<Json<Value>, Error> {
    let user_id = UserID::new(user_id);

    delete_entry(user_id, entry_id, &*lock_connection(&state.db_connection)?).inspect_err(
        |error| tracing::debug!("Could not delete entry {entry_id} of user {user_id}: {error}"),
    )?;

    Ok(Json(json!({ "message": "Data deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::test_utils::{get_test_server_and_state, record_spend, sign_up};

    #[tokio::test]
    async fn deletes_entry() {
        let (server, _) = get_test_server_and_state();
        let user_id = sign_up(&server, "Alice", "a@x.com", "hunter2").await;
        let entry = record_spend(&server, user_id, "food", 1.0).await;
        let entry_id = entry["id"].as_i64().unwrap();

        server
            .delete(&format!("/users/{user_id}/data/{entry_id}"))
            .await
            .assert_status_ok();

        let entries = server
            .get(&format!("/users/{user_id}"))
            .await
            .json::<Vec<Value>>();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn cannot_delete_other_users_entry() {
        let (server, _) = get_test_server_and_state();
        let alice = sign_up(&server, "Alice", "a@x.com", "hunter2").await;
        let bob = sign_up(&server, "Bob", "b@x.com", "hunter3").await;
        let entry = record_spend(&server, alice, "food", 1.0).await;
        let entry_id = entry["id"].as_i64().unwrap();

        let response = server
            .delete(&format!("/users/{bob}/data/{entry_id}"))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["message"], "Data not found");
        let entries = server
            .get(&format!("/users/{alice}"))
            .await
            .json::<Vec<Value>>();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let (server, _) = get_test_server_and_state();

        let response = server.delete("/users/3/data/1").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["message"], "User not found");
    }
}
