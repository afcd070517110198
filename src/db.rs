//! Database initialization for the application's SQLite database.

use rusqlite::Connection;

use crate::{
    Error,
    group::{
        create_group_account_table, create_group_member_set_table, create_member_data_table,
        create_member_set_table,
    },
    ledger::create_ledger_entry_table,
    user::create_user_table,
};

/// Create all the tables the application needs if they do not already exist.
///
/// Foreign key enforcement is switched on for `connection`.
/// The tables are created inside a single transaction so a failure leaves the
/// database untouched.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_ledger_entry_table(&transaction)?;
    create_group_account_table(&transaction)?;
    create_member_set_table(&transaction)?;
    create_group_member_set_table(&transaction)?;
    create_member_data_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
