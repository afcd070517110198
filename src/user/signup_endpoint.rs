//! Defines the endpoint for signing up a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState, Error, PasswordHash,
    app_state::lock_connection,
    extract::JsonBody,
    user::{create_user, email_exists},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignupState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for hashing the new password.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for SignupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// The request body for signing up.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupForm {
    /// The user's display name.
    pub name: String,
    /// The email to log in with.
    pub email: String,
    /// The raw password, hashed before it is stored.
    pub password: String,
}

/// A route handler for registering a new user, responds with 201 Created and the new user's ID.
///
/// The email is checked before the password is hashed so that duplicate sign ups are rejected
/// without doing the expensive hashing work. The database lock is not held while hashing.
pub async fn signup_endpoint(
    State(state): State<SignupState>,
    JsonBody(form): JsonBody<SignupForm>,
) -> Result<Response, Error> {
    if email_exists(&form.email, &*lock_connection(&state.db_connection)?)? {
        return Err(Error::DuplicateEmail);
    }

    let password_hash = PasswordHash::new(&form.password, state.password_hash_cost)?;

    let user = create_user(
        &form.name,
        &form.email,
        password_hash,
        &*lock_connection(&state.db_connection)?,
    )?;

    tracing::info!("Signed up user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Got your credentials! You're now part of the family.",
            "userId": user.id,
        })),
    )
        .into_response())
}
