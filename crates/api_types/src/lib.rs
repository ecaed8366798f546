use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field-level error reported by a failed operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub key: String,
    pub message: String,
}

/// Envelope of every response body.
///
/// `data` is present on success, `errors` only when a validation failure
/// carries field errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiError>>,
}

impl<T> ApiResult<T> {
    pub fn ok(data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
            errors: None,
        }
    }

    pub fn fail(message: impl Into<String>, errors: Vec<ApiError>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: (!errors.is_empty()).then_some(errors),
        }
    }
}

/// Inclusive date range, as query parameters (`?start=2024-01-01&end=2024-01-31`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub mod transaction {
    use super::*;

    /// Request body for creating a transaction.
    ///
    /// Every field is optional on the wire so missing values come back as
    /// field errors instead of a deserialization failure.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// `1` income, `2` expense.
        pub kind: Option<i32>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub date: Option<DateTime<FixedOffset>>,
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
    }

    /// Request body for replacing a transaction.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub kind: Option<i32>,
        pub date: Option<DateTime<FixedOffset>>,
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        /// `income` or `expense`.
        pub kind: String,
        pub kind_code: i32,
        pub date: DateTime<FixedOffset>,
        pub description: String,
        pub amount_minor: i64,
        pub user_id: Option<String>,
        pub created_at: DateTime<FixedOffset>,
        pub updated_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryEntryView {
        pub id: Uuid,
        pub kind: String,
        pub date: DateTime<FixedOffset>,
        pub description: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailySummaryView {
        pub date: NaiveDate,
        pub income_minor: i64,
        pub expense_minor: i64,
        pub net_minor: i64,
        pub transactions: Vec<SummaryEntryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FinancialSummaryView {
        pub start: NaiveDate,
        pub end: NaiveDate,
        /// Balance of everything dated before `start`.
        pub carry_over_minor: i64,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub final_balance_minor: i64,
        pub days: Vec<DailySummaryView>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRegister {
        pub username: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordResetRequest {
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordResetConfirm {
        pub token: String,
        pub new_password: String,
    }
}
