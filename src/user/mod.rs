//! User accounts: signing up, logging in, listing and deleting users.

mod core;
mod delete_endpoint;
mod list_endpoint;
mod log_in_endpoint;
mod signup_endpoint;

pub use core::{
    User, UserID, create_user, create_user_table, delete_user, email_exists, ensure_user_exists,
    get_user_by_email, get_user_by_id, list_users,
};
pub use delete_endpoint::delete_user_endpoint;
pub use list_endpoint::list_users_endpoint;
pub use log_in_endpoint::log_in_endpoint;
pub use signup_endpoint::signup_endpoint;
