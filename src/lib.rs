//! Spendbook is a backend for tracking personal and group expenses.
//!
//! Users record spending against per-category budgets, keep an overall budget
//! and can band together in password protected groups.
//! This library provides a JSON REST API over a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod budget;
mod db;
pub mod endpoints;
mod extract;
mod group;
mod ledger;
mod logging;
mod password;
mod routing;
#[cfg(test)]
mod test_utils;
mod user;

pub use app_state::AppState;
pub use budget::{BudgetChange, BudgetUpdate, get_budget, set_budget};
pub use db::initialize as initialize_db;
pub use group::{
    Group, GroupId, MemberSet, MemberSetId, create_group, get_member_set, join_group, list_groups,
};
pub use ledger::{
    DEFAULT_CATEGORY_BUDGET, EntryId, LedgerEntry, RecordOutcome, delete_entry, get_entry,
    list_for_user, record_spend,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::PasswordHash;
pub use routing::build_router;
pub use user::{User, UserID, delete_user, get_user_by_email, get_user_by_id, list_users};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// No user has the ID given in the request.
    #[error("the user could not be found")]
    UserNotFound,

    /// No ledger entry with the given ID belongs to the user.
    #[error("the ledger entry could not be found")]
    EntryNotFound,

    /// No group has the given name.
    #[error("the group could not be found")]
    GroupNotFound,

    /// The email used to log in does not belong to a registered user.
    #[error("no user is registered with this email")]
    EmailNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The email used to sign up is already registered.
    #[error("a user already exists with this email")]
    DuplicateEmail,

    /// The group name is already taken.
    #[error("a group already exists with this name")]
    DuplicateGroupName,

    /// A second ledger entry was written for a (user, category) pair.
    #[error("a ledger entry already exists for this category")]
    DuplicateCategory,

    /// The member is already part of the group they tried to join.
    #[error("the member is already part of this group")]
    AlreadyMember,

    /// A member set with the same identity exists but belongs to other groups.
    ///
    /// Linking it to a second group is not supported, the client should join
    /// with a different member identity.
    #[error("the member identity is already used outside of this group")]
    MemberInOtherGroup,

    /// The password did not match the stored hash.
    #[error("invalid password")]
    InvalidCredentials,

    /// The request body or path could not be parsed, e.g. a missing JSON field or a
    /// non-numeric ID.
    #[error("{0}")]
    InvalidRequest(String),

    /// An amount or budget was negative and rejected by the database.
    #[error("amounts and budgets cannot be negative")]
    NegativeValue,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

// Extended result codes, see https://www.sqlite.org/rescode.html
const SQLITE_CONSTRAINT_CHECK: std::ffi::c_int = 275;
const SQLITE_CONSTRAINT_UNIQUE: std::ffi::c_int = 2067;

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("group_account.name") =>
            {
                Error::DuplicateGroupName
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("ledger_entry.category") =>
            {
                Error::DuplicateCategory
            }
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == SQLITE_CONSTRAINT_CHECK =>
            {
                Error::NegativeValue
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::UserNotFound
            | Error::EntryNotFound
            | Error::GroupNotFound
            | Error::EmailNotFound
            | Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail
            | Error::DuplicateGroupName
            | Error::DuplicateCategory
            | Error::MemberInOtherGroup => StatusCode::CONFLICT,
            Error::AlreadyMember | Error::NegativeValue | Error::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::HashingError(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Error::UserNotFound => "User not found".to_owned(),
            Error::EntryNotFound => "Data not found".to_owned(),
            Error::GroupNotFound => "Group not found".to_owned(),
            Error::EmailNotFound => "Email incorrect".to_owned(),
            Error::InvalidCredentials => "Password incorrect".to_owned(),
            Error::DuplicateEmail => "User already exists with this email".to_owned(),
            Error::DuplicateGroupName => "Group name already taken".to_owned(),
            Error::AlreadyMember => "Already a member of this group".to_owned(),
            Error::InvalidRequest(reason) => reason.clone(),
            Error::HashingError(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                "Internal server error".to_owned()
            }
            error => {
                let mut message = error.to_string();
                if let Some(first) = message.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                message
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal errors are not intended to be shown to the client.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}
