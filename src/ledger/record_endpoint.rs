//! Defines the endpoint for recording spending in a category.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::lock_connection,
    extract::{JsonBody, PathParams},
    ledger::{LedgerEntry, LedgerState, RecordOutcome, record_spend},
    user::UserID,
};

/// The request body for recording spending.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpendForm {
    /// The category the money was spent in.
    pub category: String,
    /// How much was spent.
    pub amount: f64,
    /// The budget for the category, only used if the category is new for the user.
    pub budget: Option<f64>,
}

/// A route handler for recording spending.
///
/// Responds with 201 Created and the new entry when the category is new for the user,
/// otherwise with 200 OK and the entry after the amount has been added to it.
pub async fn record_spend_endpoint(
    State(state): State<LedgerState>,
    PathParams(user_id): PathParams<i64>,
    JsonBody(form): JsonBody<SpendForm>,
) -> Result<(StatusCode, Json<LedgerEntry>), Error> {
    let user_id = UserID::new(user_id);

    let (entry, outcome) = record_spend(
        user_id,
        &form.category,
        form.amount,
        form.budget,
        &*lock_connection(&state.db_connection)?,
    )?;

    let status = match outcome {
        RecordOutcome::Accumulated => StatusCode::OK,
        RecordOutcome::Created => {
            tracing::debug!("Created ledger entry {} for user {user_id}", entry.id);
            StatusCode::CREATED
        }
    };

    Ok((status, Json(entry)))
}
