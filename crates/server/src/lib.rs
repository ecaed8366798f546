use api_types::{ApiError, ApiResult};
use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Failure, FailureKind, NotificationItem, Outcome};

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod server;
mod summary;
mod transactions;
mod user;

pub mod types {
    pub use api_types::{ApiError, ApiResult, PeriodQuery};

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionCreated, TransactionNew, TransactionUpdate, TransactionView,
        };
    }

    pub mod summary {
        pub use api_types::summary::{DailySummaryView, FinancialSummaryView, SummaryEntryView};
    }

    pub mod user {
        pub use api_types::user::{
            PasswordResetConfirm, PasswordResetRequest, UserCreated, UserRegister,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Failure(Failure),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::AmountOverflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Mail(_) | EngineError::Credential(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn status_for_failure(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::Validation => StatusCode::BAD_REQUEST,
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_errors(items: Vec<NotificationItem>) -> Vec<ApiError> {
    items
        .into_iter()
        .map(|item| ApiError {
            key: item.key,
            message: item.message,
        })
        .collect()
}

fn body_for_engine_error(err: EngineError) -> ApiResult<()> {
    match err {
        EngineError::Validation(notification) => {
            ApiResult::fail("validation failed", api_errors(notification.into_items()))
        }
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ApiResult::fail("internal server error", Vec::new())
        }
        other => ApiResult::fail(other.to_string(), Vec::new()),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Failure(failure) => (
                status_for_failure(failure.kind),
                ApiResult::fail(failure.message, api_errors(failure.errors)),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, ApiResult::fail(err, Vec::new())),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Malformed or mistyped request bodies still answer with the envelope.
impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        tracing::warn!("rejected request body: {value}");
        Self::Generic(value.body_text())
    }
}

impl From<Failure> for ServerError {
    fn from(value: Failure) -> Self {
        Self::Failure(value)
    }
}

/// Unwrap a successful outcome into the response envelope, mapping its data
/// with `f`.
pub(crate) fn respond<T, U>(
    outcome: Outcome<T>,
    f: impl FnOnce(T) -> U,
) -> Result<Json<ApiResult<U>>, ServerError> {
    match outcome {
        Outcome::Success { message, data } => Ok(Json(ApiResult::ok(f(data), message))),
        Outcome::Failure(failure) => Err(failure.into()),
    }
}
