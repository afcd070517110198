use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, UserID, build_router,
    endpoints::{self, format_endpoint},
};

/// The lowest cost bcrypt accepts, keeps the tests fast.
pub(crate) const TEST_HASH_COST: u32 = 4;

pub(crate) fn get_test_server_and_state() -> (TestServer, AppState) {
    let connection =
        Connection::open_in_memory().expect("Could not open database in memory.");
    let state = AppState::new(connection, TEST_HASH_COST).expect("Could not create app state.");
    let server =
        TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

    (server, state)
}

pub(crate) async fn sign_up(server: &TestServer, name: &str, email: &str, password: &str) -> UserID {
    let response = server
        .post(endpoints::SIGNUP)
        .json(&json!({
            "name": name,
            "email": email,
            "password": password,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    UserID::new(
        response.json::<Value>()["userId"]
            .as_i64()
            .expect("Sign up response missing user ID"),
    )
}

pub(crate) async fn record_spend(
    server: &TestServer,
    user_id: UserID,
    category: &str,
    amount: f64,
) -> Value {
    server
        .post(&format_endpoint(endpoints::USER_DATA, user_id.as_i64()))
        .json(&json!({
            "category": category,
            "amount": amount,
        }))
        .await
        .json::<Value>()
}

pub(crate) async fn create_group(
    server: &TestServer,
    name: &str,
    password: &str,
    members: &str,
) -> Value {
    let response = server
        .post(endpoints::CREATE_GROUP)
        .json(&json!({
            "groupName": name,
            "groupPassword": password,
            "groupMembers": members,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    response.json::<Value>()
}
