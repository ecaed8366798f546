//! Uniform return shape of the service layer.
//!
//! Expected failures (validation, missing rows) are values, not errors:
//! callers always get an [`Outcome`] back. Three shapes exist:
//!
//! - success with data (and an optional message),
//! - failure with a single message,
//! - failure with a message and the list of field errors.

use serde::Serialize;

use crate::{Notification, NotificationItem};

/// Why an operation failed.
///
/// The HTTP boundary uses it to pick the status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    NotFound,
    Internal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub errors: Vec<NotificationItem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Success { message: Option<String>, data: T },
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self::Success {
            message: None,
            data,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self::Success {
            message: Some(message.into()),
            data,
        }
    }

    fn fail(kind: FailureKind, message: impl Into<String>, errors: Vec<NotificationItem>) -> Self {
        Self::Failure(Failure {
            kind,
            message: message.into(),
            errors,
        })
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::fail(FailureKind::Validation, message, Vec::new())
    }

    pub fn invalid_with_errors(message: impl Into<String>, errors: Notification) -> Self {
        Self::fail(FailureKind::Validation, message, errors.into_items())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::fail(FailureKind::NotFound, message, Vec::new())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::fail(FailureKind::Internal, message, Vec::new())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } => message.as_deref(),
            Self::Failure(failure) => Some(failure.message.as_str()),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Field errors of a failure; empty on success.
    pub fn errors(&self) -> &[NotificationItem] {
        match self {
            Self::Success { .. } => &[],
            Self::Failure(failure) => &failure.errors,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success { message, data } => Outcome::Success {
                message,
                data: f(data),
            },
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure(failure) => Err(failure),
        }
    }
}
