//! Personal finance engine.
//!
//! Income and expense transactions validated through the notification
//! pattern, a period summary with carry-over balance, users with password
//! reset, and negative balance alerts.

pub use commands::{CreateTransactionCmd, RegisterUserCmd, UpdateTransactionCmd};
pub use entity::{Entity, EntityMeta};
pub use error::EngineError;
pub use mail::{MailMessage, Mailer};
pub use money::format_minor;
pub use notification::{Notification, NotificationItem};
pub use ops::{Engine, EngineBuilder, SummaryService, TransactionService, check_period};
pub use outcome::{Failure, FailureKind, Outcome};
pub use store::{SeaOrmTransactionStore, TransactionStore, UserBalance};
pub use summary::{DailySummary, FinancialSummary, SummaryEntry, summarize};
pub use transactions::{DESCRIPTION_MAX_LEN, MAX_AMOUNT_MINOR, Transaction, TransactionKind};
pub use users::User;

mod commands;
mod entity;
mod error;
mod mail;
mod money;
mod notification;
mod ops;
mod outcome;
mod store;
mod summary;
mod transactions;
mod users;
pub mod validation;

type ResultEngine<T> = Result<T, EngineError>;
