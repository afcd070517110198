//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/{user_id}', use [format_endpoint].

/// The route to list all users.
pub const USERS: &str = "/users";
/// The route to access a single user: their ledger entries, or deleting the account.
pub const USER: &str = "/users/{user_id}";
/// The route for registering a new user.
pub const SIGNUP: &str = "/signup";
/// The route for logging in a user.
pub const LOG_IN: &str = "/login";
/// The route for recording spending in a category.
pub const USER_DATA: &str = "/users/{user_id}/data";
/// The route for deleting a single ledger entry.
pub const USER_DATA_ENTRY: &str = "/users/{user_id}/data/{data_id}";
/// The route for reading and setting a user's overall budget.
pub const USER_BUDGET: &str = "/users/{user_id}/budget";
/// The route for creating a group.
pub const CREATE_GROUP: &str = "/create-group";
/// The route for joining a group.
pub const JOIN_GROUP: &str = "/join-group";
/// The route to list all groups.
pub const GROUPS: &str = "/groups";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
/// Call this function once per parameter for paths with more than one.
///
/// This function assumes that an endpoint path only contains ASCII characters.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
