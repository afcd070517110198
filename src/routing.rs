//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;

use crate::{
    AppState,
    budget::{get_budget_endpoint, set_budget_endpoint},
    endpoints,
    group::{create_group_endpoint, join_group_endpoint, list_groups_endpoint},
    ledger::{delete_entry_endpoint, list_entries_endpoint, record_spend_endpoint},
    user::{delete_user_endpoint, list_users_endpoint, log_in_endpoint, signup_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route(endpoints::USERS, get(list_users_endpoint))
        .route(
            endpoints::USER,
            get(list_entries_endpoint).delete(delete_user_endpoint),
        )
        .route(endpoints::SIGNUP, post(signup_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint));

    let ledger_routes = Router::new()
        .route(endpoints::USER_DATA, post(record_spend_endpoint))
        .route(endpoints::USER_DATA_ENTRY, delete(delete_entry_endpoint))
        .route(
            endpoints::USER_BUDGET,
            get(get_budget_endpoint).post(set_budget_endpoint),
        );

    let group_routes = Router::new()
        .route(endpoints::CREATE_GROUP, post(create_group_endpoint))
        .route(endpoints::JOIN_GROUP, post(join_group_endpoint))
        .route(endpoints::GROUPS, get(list_groups_endpoint));

    user_routes
        .merge(ledger_routes)
        .merge(group_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
        .into_response()
}
