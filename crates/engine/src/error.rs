//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] returned by the throwing entity paths when one or more
//!   business rules are violated.
//! - [`KeyNotFound`] returned when an item is not found.
//! - [`AmountOverflow`] returned when a sum of amounts does not fit in `i64`.
//! - [`Credential`] returned when a password digest cannot be computed.
//! - [`Database`] wraps every failure coming from the store.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`AmountOverflow`]: EngineError::AmountOverflow
//!  [`Credential`]: EngineError::Credential
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

use crate::Notification;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(Notification),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Mail delivery failed: {0}")]
    Mail(String),
    #[error("Credential error: {0}")]
    Credential(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::AmountOverflow(a), Self::AmountOverflow(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::Mail(a), Self::Mail(b)) => a == b,
            (Self::Credential(a), Self::Credential(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
