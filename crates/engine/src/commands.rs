//! Command structs for engine operations.
//!
//! Transaction commands carry raw, optional input exactly as it arrived at the
//! boundary; [`crate::validation`] checks their shape before any entity is
//! built.

use chrono::{DateTime, Utc};

/// Create a transaction.
#[derive(Clone, Debug, Default)]
pub struct CreateTransactionCmd {
    /// Wire code of the kind (`1` income, `2` expense).
    pub kind: Option<i32>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub amount_minor: Option<i64>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        kind: i32,
        date: DateTime<Utc>,
        description: impl Into<String>,
        amount_minor: i64,
    ) -> Self {
        Self {
            kind: Some(kind),
            date: Some(date),
            description: Some(description.into()),
            amount_minor: Some(amount_minor),
        }
    }
}

/// Replace every business field of an existing transaction.
#[derive(Clone, Debug, Default)]
pub struct UpdateTransactionCmd {
    pub kind: Option<i32>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub amount_minor: Option<i64>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(
        kind: i32,
        date: DateTime<Utc>,
        description: impl Into<String>,
        amount_minor: i64,
    ) -> Self {
        Self {
            kind: Some(kind),
            date: Some(date),
            description: Some(description.into()),
            amount_minor: Some(amount_minor),
        }
    }
}

/// Register a new user.
#[derive(Clone, Debug)]
pub struct RegisterUserCmd {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterUserCmd {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}
