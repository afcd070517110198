//! The budget register: a single overall budget per user.
//!
//! This budget is stored on the user and is independent of the per-category budget ceilings in
//! the ledger. Changing one never touches the other.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    extract::{JsonBody, PathParams},
    user::{UserID, get_user_by_id},
};

/// The direction a budget moved in when it was overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetChange {
    /// The new budget is lower than the previous one.
    Decreased,
    /// The new budget is higher than the previous one.
    Increased,
    /// The new budget is the same as the previous one.
    Unchanged,
}

impl BudgetChange {
    /// Compare a user's previous budget with the new one.
    ///
    /// A budget that was never set compares as zero.
    pub fn between(previous: Option<f64>, new: f64) -> Self {
        let previous = previous.unwrap_or(0.0);

        if new < previous {
            BudgetChange::Decreased
        } else if new > previous {
            BudgetChange::Increased
        } else {
            BudgetChange::Unchanged
        }
    }
}

/// The result of overwriting a user's budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    /// The budget before the update, `None` if it had never been set.
    pub prev_budget: Option<f64>,
    /// The budget after the update.
    pub new_budget: f64,
    /// Which way the budget moved.
    pub change: BudgetChange,
}

impl BudgetUpdate {
    fn message(&self) -> String {
        let previous = self.prev_budget.unwrap_or(0.0);

        match self.change {
            BudgetChange::Decreased => {
                format!("Budget decreased from {previous} to {}", self.new_budget)
            }
            BudgetChange::Increased => {
                format!("Budget increased from {previous} to {}", self.new_budget)
            }
            BudgetChange::Unchanged => format!("Budget unchanged at {}", self.new_budget),
        }
    }
}

/// Overwrite the budget of `user_id` with `new_budget`.
///
/// # Errors
///
/// This function will return an:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - [Error::NegativeValue] if `new_budget` is negative,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn set_budget(
    user_id: UserID,
    new_budget: f64,
    connection: &Connection,
) -> Result<BudgetUpdate, Error> {
    let prev_budget = get_user_by_id(user_id, connection)?.budget;

    connection.execute(
        "UPDATE user SET budget = ?1 WHERE id = ?2",
        (new_budget, user_id.as_i64()),
    )?;

    Ok(BudgetUpdate {
        prev_budget,
        new_budget,
        change: BudgetChange::between(prev_budget, new_budget),
    })
}

/// Get the budget of `user_id`, `None` if the user has never set one.
///
/// # Errors
///
/// This function will return an:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn get_budget(user_id: UserID, connection: &Connection) -> Result<Option<f64>, Error> {
    get_user_by_id(user_id, connection).map(|user| user.budget)
}

/// The state needed to get or set a user's budget.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for setting a budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetForm {
    /// The new overall budget.
    pub budget: f64,
}

/// A route handler for overwriting a user's budget.
///
/// Responds with a message describing which way the budget moved, plus the previous and new values.
pub async fn set_budget_endpoint(
    State(state): State<BudgetState>,
    PathParams(user_id): PathParams<i64>,
    JsonBody(form): JsonBody<BudgetForm>,
) -> Result<Json<Value>, Error> {
    let update = set_budget(
        UserID::new(user_id),
        form.budget,
        &*lock_connection(&state.db_connection)?,
    )?;

    Ok(Json(json!({
        "message": update.message(),
        "prevBudget": update.prev_budget,
        "newBudget": update.new_budget,
        "change": update.change,
    })))
}

/// A route handler that responds with a user's budget, `null` if it was never set.
pub async fn get_budget_endpoint(
    State(state): State<BudgetState>,
    PathParams(user_id): PathParams<i64>,
) -> Result<Json<Value>, Error> {
    let budget = get_budget(
        UserID::new(user_id),
        &*lock_connection(&state.db_connection)?,
    )?;

    Ok(Json(json!({ "budget": budget })))
}


#[cfg(test)]
mod set_budget_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash, initialize_db,
        ledger::{DEFAULT_CATEGORY_BUDGET, list_for_user, record_spend},
        user::{UserID, create_user},
    };

    use super::{BudgetChange, BudgetUpdate, get_budget, set_budget};

    fn get_connection_with_user() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        let user = create_user(
            "Alice",
            "a@x.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (connection, user.id)
    }

    #[test]
    fn budget_is_unset_for_new_user() {
        let (connection, user_id) = get_connection_with_user();

        assert_eq!(get_budget(user_id, &connection), Ok(None));
    }

    #[test]
    fn decrease_is_reported_with_previous_budget() {
        let (connection, user_id) = get_connection_with_user();
        set_budget(user_id, 100.0, &connection).unwrap();

        let update = set_budget(user_id, 50.0, &connection).unwrap();

        assert_eq!(
            update,
            BudgetUpdate {
                prev_budget: Some(100.0),
                new_budget: 50.0,
                change: BudgetChange::Decreased,
            }
        );
        assert_eq!(get_budget(user_id, &connection), Ok(Some(50.0)));
    }

    #[test]
    fn same_budget_twice_is_unchanged() {
        let (connection, user_id) = get_connection_with_user();
        set_budget(user_id, 50.0, &connection).unwrap();

        let update = set_budget(user_id, 50.0, &connection).unwrap();

        assert_eq!(update.change, BudgetChange::Unchanged);
        assert_eq!(update.prev_budget, Some(50.0));
    }

    #[test]
    fn increase_is_reported() {
        let (connection, user_id) = get_connection_with_user();
        set_budget(user_id, 50.0, &connection).unwrap();

        let update = set_budget(user_id, 75.0, &connection).unwrap();

        assert_eq!(update.change, BudgetChange::Increased);
        assert_eq!(update.message(), "Budget increased from 50 to 75");
    }

    #[test]
    fn fails_for_missing_user() {
        let (connection, _) = get_connection_with_user();

        assert_eq!(
            set_budget(UserID::new(999), 50.0, &connection),
            Err(Error::UserNotFound)
        );
        assert_eq!(
            get_budget(UserID::new(999), &connection),
            Err(Error::UserNotFound)
        );
    }

    #[test]
    fn negative_budget_is_rejected() {
        let (connection, user_id) = get_connection_with_user();
        set_budget(user_id, 50.0, &connection).unwrap();

        assert_eq!(
            set_budget(user_id, -1.0, &connection),
            Err(Error::NegativeValue)
        );
        assert_eq!(get_budget(user_id, &connection), Ok(Some(50.0)));
    }

    #[test]
    fn does_not_touch_category_budgets() {
        let (connection, user_id) = get_connection_with_user();
        record_spend(user_id, "food", 10.0, None, &connection).unwrap();

        set_budget(user_id, 1.0, &connection).unwrap();

        let entries = list_for_user(user_id, &connection).unwrap();
        assert_eq!(entries[0].budget, DEFAULT_CATEGORY_BUDGET);
    }
}

#[cfg(test)]
mod budget_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_utils::{get_test_server_and_state, sign_up};

    #[tokio::test]
    async fn set_then_get_budget() {
        let (server, _) = get_test_server_and_state();
        let user_id = sign_up(&server, "Alice", "a@x.com", "hunter2").await;

        let response = server.get(&format!("/users/{user_id}/budget")).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["budget"], Value::Null);

        server
            .post(&format!("/users/{user_id}/budget"))
            .json(&json!({ "budget": 100.0 }))
            .await
            .assert_status_ok();
        let response = server
            .post(&format!("/users/{user_id}/budget"))
            .json(&json!({ "budget": 50.0 }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["change"], "decreased");
        assert_eq!(body["prevBudget"], 100.0);
        assert_eq!(body["newBudget"], 50.0);
        assert_eq!(body["message"], "Budget decreased from 100 to 50");

        let response = server.get(&format!("/users/{user_id}/budget")).await;
        assert_eq!(response.json::<Value>()["budget"], 50.0);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let (server, _) = get_test_server_and_state();

        server
            .post("/users/5/budget")
            .json(&json!({ "budget": 10.0 }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/users/5/budget")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
