//! Code for creating the user table and fetching, creating and deleting users.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash, ledger::delete_all_for_user};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email the user signed up with, unique across all users.
    pub email: String,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// The user's overall budget, `None` until the user sets one.
    pub budget: Option<f64>,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                budget REAL CHECK (budget >= 0)
                )",
        (),
    )?;

    Ok(())
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name = row.get(1)?;
    let email = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let budget = row.get(4)?;

    Ok(User {
        id: UserID::new(raw_id),
        name,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        budget,
    })
}

/// Create and insert a new user into the database.
///
/// The user starts without a budget and without any ledger entries.
///
/// # Errors
///
/// This function will return an:
/// - [Error::DuplicateEmail] if `email` is already registered,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    name: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3)",
        (name, email, password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_owned(),
        email: email.to_owned(),
        password_hash,
        budget: None,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - [Error::SqlError] if there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, budget FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row_to_user)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::UserNotFound,
            error => error,
        })
}

/// Get the user from the database that signed up with `email`.
///
/// The email must match exactly.
///
/// # Errors
///
/// This function will return an:
/// - [Error::EmailNotFound] if no user signed up with `email`,
/// - [Error::SqlError] if there was an error trying to access the database.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, budget FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_row_to_user)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::EmailNotFound,
            error => error,
        })
}

/// Check whether a user has already signed up with `email`.
pub fn email_exists(email: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM user WHERE email = ?1)",
            (email,),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Return [Error::UserNotFound] unless `user_id` belongs to a registered user.
pub fn ensure_user_exists(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let exists: bool = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM user WHERE id = ?1)",
        (user_id.as_i64(),),
        |row| row.get(0),
    )?;

    if exists {
        Ok(())
    } else {
        Err(Error::UserNotFound)
    }
}

/// Get every registered user, in the order they signed up.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn list_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, name, email, password, budget FROM user ORDER BY id ASC")?
        .query_map([], map_row_to_user)?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect()
}

/// Delete a user together with all of their ledger entries.
///
/// The entries are deleted first and then the user, inside a single transaction.
///
/// # Errors
///
/// This function will return an:
/// - [Error::UserNotFound] if no user row was deleted,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let entries_deleted = delete_all_for_user(user_id, &transaction)?;
    let users_deleted = transaction.execute(
        "DELETE FROM user WHERE id = :id",
        &[(":id", &user_id.as_i64())],
    )?;

    if users_deleted == 0 {
        return Err(Error::UserNotFound);
    }

    transaction.commit()?;
    tracing::debug!("Deleted user {user_id} and {entries_deleted} ledger entries");

    Ok(())
}
