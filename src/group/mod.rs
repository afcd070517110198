//! Shared groups: creating a group, joining it with the group password and listing groups.

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod core;
mod create_endpoint;
mod join_endpoint;
mod list_endpoint;

pub use core::{
    Group, GroupId, MemberSet, MemberSetId, add_member, create_group,
    create_group_account_table, create_group_member_set_table, create_member_data_table,
    create_member_set_table, get_group_by_name, get_member_set, group_name_exists, join_group,
    list_groups, verify_group_password,
};
pub use create_endpoint::create_group_endpoint;
pub use join_endpoint::join_group_endpoint;
pub use list_endpoint::list_groups_endpoint;

/// The request body for creating or joining a group.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupForm {
    /// The name of the group.
    pub group_name: String,
    /// The raw group password.
    pub group_password: String,
    /// The member identity, treated as a single opaque value.
    pub group_members: Value,
}

impl GroupForm {
    /// The member identity as stored in a member set.
    ///
    /// Strings are used verbatim, any other JSON value is stored as its JSON text.
    fn member_identity(&self) -> String {
        match &self.group_members {
            Value::String(members) => members.clone(),
            other => other.to_string(),
        }
    }
}
