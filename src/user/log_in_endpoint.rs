//! Defines the endpoint for logging in with an email and password.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    extract::JsonBody,
    user::{UserID, get_user_by_email},
};

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for logging in.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogInData {
    /// The email the user signed up with.
    pub email: String,
    /// The raw password to check against the stored hash.
    pub password: String,
}

/// The response body for a successful log-in.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInResponse {
    /// A human readable confirmation.
    pub message: String,
    /// The ID of the user that logged in.
    pub user_id: UserID,
    /// The display name of the user that logged in.
    pub name: String,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    JsonBody(user_data): JsonBody<LogInData>,
) -> Result<(StatusCode, Json<LogInResponse>), Error> {
    let user = get_user_by_email(&user_data.email, &*lock_connection(&state.db_connection)?)?;

    if !user.password_hash.verify(&user_data.password)? {
        return Err(Error::InvalidCredentials);
    }

    tracing::debug!("User {} logged in", user.id);

    Ok((
        StatusCode::OK,
        Json(LogInResponse {
            message: "Successfully logged in".to_owned(),
            user_id: user.id,
            name: user.name,
        }),
    ))
}
