//! Password protected groups and the member sets that belong to them.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash};

/// Alias for the integer type used for group IDs.
pub type GroupId = i64;
/// Alias for the integer type used for member set IDs.
pub type MemberSetId = i64;

/// A named group of member sets, protected by a group password.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// The ID of the group.
    pub id: GroupId,
    /// The group's name, unique across all groups.
    #[serde(rename = "groupName")]
    pub name: String,
    /// The hash of the password needed to join the group.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// The member sets linked to the group, in the order they joined.
    #[serde(rename = "groupMembers")]
    pub member_set_ids: Vec<MemberSetId>,
    /// When the group was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the group last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A member of one or more groups and the amount they have spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSet {
    /// The ID of the member set.
    pub id: MemberSetId,
    /// The free text member identity. Matched exactly, no normalisation.
    pub members: String,
    /// The amount the member has spent.
    #[serde(rename = "spents")]
    pub spent: f64,
    /// References to finer grained member data records.
    pub members_data: Vec<i64>,
    /// When the member set was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the member set last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Create the group table.
///
/// `group` is an SQL keyword, hence the table name.
pub fn create_group_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS group_account (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Create the member set table.
pub fn create_member_set_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS member_set (
            id INTEGER PRIMARY KEY,
            members TEXT NOT NULL,
            spent REAL NOT NULL DEFAULT 0 CHECK (spent >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Create the table linking groups to their member sets.
pub fn create_group_member_set_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS group_member_set (
            group_id INTEGER NOT NULL,
            member_set_id INTEGER NOT NULL,
            PRIMARY KEY (group_id, member_set_id),
            FOREIGN KEY(group_id) REFERENCES group_account(id),
            FOREIGN KEY(member_set_id) REFERENCES member_set(id)
        )",
        (),
    )?;

    Ok(())
}

/// Create the table for member data records.
///
/// Only the reference to the owning member set is stored, nothing writes to this table yet.
pub fn create_member_data_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS member_data (
            id INTEGER PRIMARY KEY,
            member_set_id INTEGER NOT NULL,
            FOREIGN KEY(member_set_id) REFERENCES member_set(id)
        )",
        (),
    )?;

    Ok(())
}

/// Check whether a group called `name` already exists.
pub fn group_name_exists(name: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM group_account WHERE name = ?1)",
            (name,),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

fn insert_member_set(
    members: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<MemberSetId, Error> {
    connection.execute(
        "INSERT INTO member_set (members, spent, created_at, updated_at) VALUES (?1, 0, ?2, ?2)",
        (members, now),
    )?;

    Ok(connection.last_insert_rowid())
}

fn link_member_set(
    group_id: GroupId,
    member_set_id: MemberSetId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO group_member_set (group_id, member_set_id) VALUES (?1, ?2)",
        (group_id, member_set_id),
    )?;

    Ok(())
}

/// Create a new group with a single member set seeded with `initial_members`.
///
/// The caller is responsible for hashing the group password.
///
/// # Errors
///
/// This function will return an:
/// - [Error::DuplicateGroupName] if a group called `name` already exists,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_group(
    name: &str,
    password_hash: PasswordHash,
    initial_members: &str,
    connection: &Connection,
) -> Result<Group, Error> {
    if group_name_exists(name, connection)? {
        return Err(Error::DuplicateGroupName);
    }

    let now = OffsetDateTime::now_utc();
    let transaction = connection.unchecked_transaction()?;

    let member_set_id = insert_member_set(initial_members, now, &transaction)?;
    transaction.execute(
        "INSERT INTO group_account (name, password, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?3)",
        (name, password_hash.as_ref(), now),
    )?;
    let group_id = transaction.last_insert_rowid();
    link_member_set(group_id, member_set_id, &transaction)?;

    transaction.commit()?;
    tracing::info!("Created group {group_id} \"{name}\"");

    get_group_by_name(name, connection)
}

fn map_row_to_group(row: &Row) -> Result<Group, rusqlite::Error> {
    let raw_password_hash: String = row.get(2)?;

    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        member_set_ids: Vec::new(),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn get_member_set_ids(
    group_id: GroupId,
    connection: &Connection,
) -> Result<Vec<MemberSetId>, Error> {
    connection
        .prepare(
            "SELECT member_set_id FROM group_member_set
            WHERE group_id = :group_id ORDER BY member_set_id ASC",
        )?
        .query_map(&[(":group_id", &group_id)], |row| row.get(0))?
        .map(|maybe_id| maybe_id.map_err(Error::from))
        .collect()
}

/// Get the group called `name`, including the IDs of its member sets.
///
/// # Errors
///
/// This function will return an:
/// - [Error::GroupNotFound] if there is no group called `name`,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn get_group_by_name(name: &str, connection: &Connection) -> Result<Group, Error> {
    let mut group = connection
        .query_row(
            "SELECT id, name, password, created_at, updated_at
            FROM group_account WHERE name = ?1",
            (name,),
            map_row_to_group,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::GroupNotFound,
            error => error,
        })?;

    group.member_set_ids = get_member_set_ids(group.id, connection)?;

    Ok(group)
}

/// Get every group with the IDs of its member sets, oldest first.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn list_groups(connection: &Connection) -> Result<Vec<Group>, Error> {
    let mut groups = connection
        .prepare(
            "SELECT id, name, password, created_at, updated_at
            FROM group_account ORDER BY id ASC",
        )?
        .query_map([], map_row_to_group)?
        .collect::<Result<Vec<_>, _>>()?;

    for group in &mut groups {
        group.member_set_ids = get_member_set_ids(group.id, connection)?;
    }

    Ok(groups)
}

/// Get a member set by its ID, including the IDs of its member data records.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no member set with the ID `member_set_id`.
pub fn get_member_set(
    member_set_id: MemberSetId,
    connection: &Connection,
) -> Result<MemberSet, Error> {
    let mut member_set = connection.query_row(
        "SELECT id, members, spent, created_at, updated_at FROM member_set WHERE id = ?1",
        (member_set_id,),
        |row| {
            Ok(MemberSet {
                id: row.get(0)?,
                members: row.get(1)?,
                spent: row.get(2)?,
                members_data: Vec::new(),
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        },
    )?;

    member_set.members_data = connection
        .prepare("SELECT id FROM member_data WHERE member_set_id = ?1 ORDER BY id ASC")?
        .query_map((member_set_id,), |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(member_set)
}

/// Add a new member set for `member_identity` to the group `group_id`.
///
/// `member_identity` is compared exactly against existing member sets.
///
/// # Errors
///
/// This function will return an:
/// - [Error::AlreadyMember] if a member set with this identity is already linked to the group,
/// - [Error::MemberInOtherGroup] if a member set with this identity exists but is only linked to
///   other groups. Such a member set is left untouched.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn add_member(
    group_id: GroupId,
    member_identity: &str,
    connection: &Connection,
) -> Result<MemberSet, Error> {
    let (in_group, exists): (bool, bool) = connection.query_row(
        "SELECT
            EXISTS (
                SELECT 1 FROM member_set ms
                INNER JOIN group_member_set gms ON gms.member_set_id = ms.id
                WHERE gms.group_id = ?1 AND ms.members = ?2
            ),
            EXISTS (SELECT 1 FROM member_set WHERE members = ?2)",
        (group_id, member_identity),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    if in_group {
        return Err(Error::AlreadyMember);
    }

    if exists {
        return Err(Error::MemberInOtherGroup);
    }

    let now = OffsetDateTime::now_utc();
    let transaction = connection.unchecked_transaction()?;

    let member_set_id = insert_member_set(member_identity, now, &transaction)?;
    link_member_set(group_id, member_set_id, &transaction)?;
    transaction.execute(
        "UPDATE group_account SET updated_at = ?1 WHERE id = ?2",
        (now, group_id),
    )?;

    transaction.commit()?;
    tracing::debug!("Member set {member_set_id} joined group {group_id}");

    get_member_set(member_set_id, connection)
}

/// Join the group called `name` as `member_identity`.
///
/// This is the composition of [get_group_by_name], a password check and [add_member].
///
/// # Errors
///
/// This function will return an:
/// - [Error::GroupNotFound] if there is no group called `name`,
/// - [Error::InvalidCredentials] if `password` does not match the group password,
/// - any error returned by [add_member].
pub fn join_group(
    name: &str,
    password: &str,
    member_identity: &str,
    connection: &Connection,
) -> Result<MemberSet, Error> {
    let group = get_group_by_name(name, connection)?;
    verify_group_password(&group, password)?;

    add_member(group.id, member_identity, connection)
}

/// Check `password` against the password of `group`.
///
/// # Errors
///
/// This function will return an:
/// - [Error::InvalidCredentials] if the password does not match,
/// - [Error::HashingError] if the stored hash could not be checked.
pub fn verify_group_password(group: &Group, password: &str) -> Result<(), Error> {
    if group.password_hash.verify(password)? {
        Ok(())
    } else {
        Err(Error::InvalidCredentials)
    }
}


#[cfg(test)]
mod join_group_tests {
    use rusqlite::Connection;

    use crate::{Error, PasswordHash, initialize_db};

    use super::{add_member, create_group, get_group_by_name, join_group, verify_group_password};

    fn get_connection_with_group() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        create_group(
            "flatmates",
            PasswordHash::new("letmein", 4).unwrap(),
            "alice",
            &connection,
        )
        .unwrap();
        connection
    }

    #[test]
    fn new_member_joins_and_collection_grows_by_one() {
        let connection = get_connection_with_group();

        let member_set = join_group("flatmates", "letmein", "bob", &connection).unwrap();

        assert_eq!(member_set.members, "bob");
        assert_eq!(member_set.spent, 0.0);
        let group = get_group_by_name("flatmates", &connection).unwrap();
        assert_eq!(group.member_set_ids.len(), 2);
        assert_eq!(group.member_set_ids[1], member_set.id);
    }

    #[test]
    fn joining_twice_is_already_member() {
        let connection = get_connection_with_group();
        join_group("flatmates", "letmein", "bob", &connection).unwrap();

        assert_eq!(
            join_group("flatmates", "letmein", "bob", &connection),
            Err(Error::AlreadyMember)
        );
        let group = get_group_by_name("flatmates", &connection).unwrap();
        assert_eq!(group.member_set_ids.len(), 2);
    }

    #[test]
    fn initial_member_is_already_member() {
        let connection = get_connection_with_group();

        assert_eq!(
            join_group("flatmates", "letmein", "alice", &connection),
            Err(Error::AlreadyMember)
        );
    }

    #[test]
    fn identity_match_is_exact() {
        let connection = get_connection_with_group();

        assert!(join_group("flatmates", "letmein", "Alice", &connection).is_ok());
        assert!(join_group("flatmates", "letmein", " alice", &connection).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let connection = get_connection_with_group();

        assert_eq!(
            join_group("flatmates", "wrong", "bob", &connection),
            Err(Error::InvalidCredentials)
        );
        let group = get_group_by_name("flatmates", &connection).unwrap();
        assert_eq!(group.member_set_ids.len(), 1);
    }

    #[test]
    fn missing_group_is_not_found() {
        let connection = get_connection_with_group();

        assert_eq!(
            join_group("strangers", "letmein", "bob", &connection),
            Err(Error::GroupNotFound)
        );
    }

    #[test]
    fn member_of_other_group_is_not_linked() {
        let connection = get_connection_with_group();
        let other = create_group(
            "colleagues",
            PasswordHash::new_unchecked("hash"),
            "carol",
            &connection,
        )
        .unwrap();

        assert_eq!(
            add_member(other.id, "alice", &connection),
            Err(Error::MemberInOtherGroup)
        );
        let other = get_group_by_name("colleagues", &connection).unwrap();
        assert_eq!(other.member_set_ids.len(), 1);
    }

    #[test]
    fn group_password_is_verified() {
        let connection = get_connection_with_group();
        let group = get_group_by_name("flatmates", &connection).unwrap();

        assert_eq!(verify_group_password(&group, "letmein"), Ok(()));
        assert_eq!(
            verify_group_password(&group, "letmein "),
            Err(Error::InvalidCredentials)
        );
    }
}
