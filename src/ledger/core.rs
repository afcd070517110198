//! The category ledger: one accumulated spend record per (user, category) pair.

use rusqlite::{Connection, Row, named_params};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    user::{UserID, ensure_user_exists},
};

/// Alias for the integer type used for ledger entry IDs.
pub type EntryId = i64;

/// The budget ceiling given to a new category when the client does not supply one.
pub const DEFAULT_CATEGORY_BUDGET: f64 = 500.0;

/// The spend a user has accumulated in a single category, with that category's budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// The ID of the entry.
    pub id: EntryId,
    /// The user that owns the entry.
    pub user_id: UserID,
    /// The spending category, unique per user.
    pub category: String,
    /// The total spent in this category so far.
    pub amount: f64,
    /// The budget ceiling for this category.
    pub budget: f64,
    /// How much of the budget is left, negative when over budget.
    pub remaining: f64,
    /// When the first spend in this category was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When spend in this category was last recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Whether [record_spend] added to an existing entry or created a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The amount was added to the existing entry for the category.
    Accumulated,
    /// The category was new for the user and a new entry was created.
    Created,
}

/// Create the ledger entry table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_ledger_entry_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS ledger_entry (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            budget REAL NOT NULL DEFAULT 500 CHECK (budget >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, category),
            FOREIGN KEY(user_id) REFERENCES user(id)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_entry(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    let amount: f64 = row.get(3)?;
    let budget: f64 = row.get(4)?;

    Ok(LedgerEntry {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        amount,
        budget,
        remaining: budget - amount,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Record `amount` of spending in `category` for the user `user_id`.
///
/// If the user already has an entry for `category`, `amount` is added to it and `budget` is
/// ignored. Otherwise a new entry is created with the budget ceiling `budget`, or
/// [DEFAULT_CATEGORY_BUDGET] if `budget` is `None`.
///
/// The addition happens inside a single `UPDATE` statement.
///
/// # Errors
///
/// This function will return an:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - [Error::NegativeValue] if the amount or budget would be negative,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn record_spend(
    user_id: UserID,
    category: &str,
    amount: f64,
    budget: Option<f64>,
    connection: &Connection,
) -> Result<(LedgerEntry, RecordOutcome), Error> {
    ensure_user_exists(user_id, connection)?;

    let now = OffsetDateTime::now_utc();

    let rows_affected = connection.execute(
        "UPDATE ledger_entry SET amount = amount + :amount, updated_at = :now
        WHERE user_id = :user_id AND category = :category",
        named_params! {
            ":amount": amount,
            ":now": now,
            ":user_id": user_id.as_i64(),
            ":category": category,
        },
    )?;

    if rows_affected != 0 {
        let entry = get_entry_by_category(user_id, category, connection)?;
        return Ok((entry, RecordOutcome::Accumulated));
    }

    connection.execute(
        "INSERT INTO ledger_entry (user_id, category, amount, budget, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        (
            user_id.as_i64(),
            category,
            amount,
            budget.unwrap_or(DEFAULT_CATEGORY_BUDGET),
            now,
        ),
    )?;

    let entry = get_entry(connection.last_insert_rowid(), connection)?;

    Ok((entry, RecordOutcome::Created))
}

/// Get a ledger entry by its ID.
///
/// # Errors
///
/// Returns [Error::EntryNotFound] if there is no entry with the ID `entry_id`.
pub fn get_entry(entry_id: EntryId, connection: &Connection) -> Result<LedgerEntry, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, amount, budget, created_at, updated_at
            FROM ledger_entry WHERE id = :id",
        )?
        .query_row(&[(":id", &entry_id)], map_row_to_entry)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::EntryNotFound,
            error => error,
        })
}

fn get_entry_by_category(
    user_id: UserID,
    category: &str,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    connection
        .query_row(
            "SELECT id, user_id, category, amount, budget, created_at, updated_at
            FROM ledger_entry WHERE user_id = ?1 AND category = ?2",
            (user_id.as_i64(), category),
            map_row_to_entry,
        )
        .map_err(Error::from)
}

/// Get all of a user's ledger entries, oldest first.
///
/// # Errors
///
/// This function will return an:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn list_for_user(user_id: UserID, connection: &Connection) -> Result<Vec<LedgerEntry>, Error> {
    ensure_user_exists(user_id, connection)?;

    let mut entries = connection
        .prepare(
            "SELECT id, user_id, category, amount, budget, created_at, updated_at
            FROM ledger_entry WHERE user_id = :user_id",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_entry)?
        .collect::<Result<Vec<_>, _>>()?;

    entries.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(entries)
}

/// Delete the ledger entry `entry_id` if it belongs to `user_id`.
///
/// # Errors
///
/// This function will return an:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - [Error::EntryNotFound] if the entry does not exist or belongs to another user,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn delete_entry(
    user_id: UserID,
    entry_id: EntryId,
    connection: &Connection,
) -> Result<(), Error> {
    ensure_user_exists(user_id, connection)?;

    let rows_affected = connection.execute(
        "DELETE FROM ledger_entry WHERE id = :id AND user_id = :user_id",
        named_params! {
            ":id": entry_id,
            ":user_id": user_id.as_i64(),
        },
    )?;

    match rows_affected {
        0 => Err(Error::EntryNotFound),
        _ => Ok(()),
    }
}

type RowsAffected = usize;

/// Delete every ledger entry owned by `user_id`, returning how many were deleted.
///
/// Only used when deleting the user.
pub(crate) fn delete_all_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM ledger_entry WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
        )
        .map_err(Error::from)
}
