//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense record owned (optionally)
//! by a user. Every business field has a pure `validate_*` function and a
//! pair of setters:
//!
//! - `try_set_*` merges failures into a caller supplied [`Notification`] and
//!   returns whether the value was applied,
//! - `set_*` returns [`EngineError::Validation`] instead.
//!
//! Construction follows the same split with [`Transaction::new_checked`] and
//! [`Transaction::new`].

use chrono::{DateTime, Months, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Entity as DomainEntity, EngineError, EntityMeta, Notification, ResultEngine,
    money::format_minor,
};

pub const DESCRIPTION_MAX_LEN: usize = 200;
pub const MAX_AGE_MONTHS: u32 = 60;
/// Largest accepted amount, in minor units (10 billion in major units).
pub const MAX_AMOUNT_MINOR: i64 = 1_000_000_000_000;

pub(crate) const KEY_TYPE: &str = "Type";
pub(crate) const KEY_DATE: &str = "Date";
pub(crate) const KEY_DESCRIPTION: &str = "Description";
pub(crate) const KEY_AMOUNT: &str = "Amount";

pub(crate) const MSG_INVALID_TYPE: &str = "invalid transaction type";
pub(crate) const MSG_FUTURE_DATE: &str = "future date not allowed";
pub(crate) const MSG_TOO_OLD: &str = "transaction older than 5 years not allowed";
pub(crate) const MSG_DESCRIPTION_REQUIRED: &str = "description required";
pub(crate) const MSG_AMOUNT_NOT_POSITIVE: &str = "amount must be greater than zero";

pub(crate) fn description_too_long_message() -> String {
    format!("description exceeds max length of {DESCRIPTION_MAX_LEN} characters")
}

pub(crate) fn amount_too_large_message() -> String {
    format!("amount must not exceed {}", format_minor(MAX_AMOUNT_MINOR))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Numeric code used on the wire.
    pub fn code(self) -> i32 {
        match self {
            Self::Income => 1,
            Self::Expense => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Income),
            2 => Some(Self::Expense),
            _ => None,
        }
    }

    /// Parse a wire code, recording a `Type` failure when it is undefined.
    pub fn parse_code(code: i32, notification: &mut Notification) -> Option<Self> {
        let kind = Self::from_code(code);
        if kind.is_none() {
            notification.merge(Transaction::validate_kind(code));
        }
        kind
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => {
                let mut notification = Notification::new();
                notification.add(KEY_TYPE, format!("{MSG_INVALID_TYPE}: {other}"));
                Err(EngineError::Validation(notification))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    meta: EntityMeta,
    kind: TransactionKind,
    date: DateTime<Utc>,
    description: String,
    amount_minor: i64,
    user_id: Option<String>,
}

impl Transaction {
    /// Build a transaction, failing with every violated rule.
    pub fn new(
        kind: TransactionKind,
        date: DateTime<Utc>,
        description: &str,
        amount_minor: i64,
        user_id: Option<String>,
    ) -> ResultEngine<Self> {
        let mut notification = Notification::new();
        let tx = Self::new_checked(
            kind,
            date,
            description,
            amount_minor,
            user_id,
            &mut notification,
        );
        if !notification.is_valid() {
            return Err(EngineError::Validation(notification));
        }
        Ok(tx)
    }

    /// Build a transaction, copying failures into `notification`.
    ///
    /// Fields are set with the given values even when validation fails; the
    /// caller decides what to do by looking at `notification`.
    pub fn new_checked(
        kind: TransactionKind,
        date: DateTime<Utc>,
        description: &str,
        amount_minor: i64,
        user_id: Option<String>,
        notification: &mut Notification,
    ) -> Self {
        notification.merge(Self::validate_kind(kind.code()));
        notification.merge(Self::validate_date(date));
        notification.merge(Self::validate_description(description));
        notification.merge(Self::validate_amount(amount_minor));

        Self {
            meta: EntityMeta::new(),
            kind,
            date,
            description: description.trim().to_string(),
            amount_minor,
            user_id,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_deleted(&self) -> bool {
        self.meta.is_deleted()
    }

    pub fn validate_kind(code: i32) -> Notification {
        let mut notification = Notification::new();
        if TransactionKind::from_code(code).is_none() {
            notification.add(KEY_TYPE, MSG_INVALID_TYPE);
        }
        notification
    }

    pub fn validate_date(date: DateTime<Utc>) -> Notification {
        Self::validate_date_at(date, Utc::now())
    }

    /// Date rules evaluated against an explicit "now".
    ///
    /// Both checks always run.
    pub fn validate_date_at(date: DateTime<Utc>, now: DateTime<Utc>) -> Notification {
        let mut notification = Notification::new();
        if date > now {
            notification.add(KEY_DATE, MSG_FUTURE_DATE);
        }
        if let Some(oldest) = now.checked_sub_months(Months::new(MAX_AGE_MONTHS))
            && date < oldest
        {
            notification.add(KEY_DATE, MSG_TOO_OLD);
        }
        notification
    }

    pub fn validate_description(description: &str) -> Notification {
        let mut notification = Notification::new();
        let trimmed = description.trim();
        if trimmed.is_empty() {
            notification.add(KEY_DESCRIPTION, MSG_DESCRIPTION_REQUIRED);
            return notification;
        }
        if trimmed.chars().count() > DESCRIPTION_MAX_LEN {
            notification.add(KEY_DESCRIPTION, description_too_long_message());
        }
        notification
    }

    pub fn validate_amount(amount_minor: i64) -> Notification {
        let mut notification = Notification::new();
        if amount_minor <= 0 {
            notification.add(KEY_AMOUNT, MSG_AMOUNT_NOT_POSITIVE);
        } else if amount_minor > MAX_AMOUNT_MINOR {
            notification.add(KEY_AMOUNT, amount_too_large_message());
        }
        notification
    }

    pub fn try_set_kind(&mut self, kind: TransactionKind, notification: &mut Notification) -> bool {
        let check = Self::validate_kind(kind.code());
        self.apply_checked(check, notification, |tx| tx.kind = kind)
    }

    pub fn set_kind(&mut self, kind: TransactionKind) -> ResultEngine<()> {
        let check = Self::validate_kind(kind.code());
        self.apply_or_fail(check, |tx| tx.kind = kind)
    }

    pub fn try_set_date(&mut self, date: DateTime<Utc>, notification: &mut Notification) -> bool {
        let check = Self::validate_date(date);
        self.apply_checked(check, notification, |tx| tx.date = date)
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) -> ResultEngine<()> {
        let check = Self::validate_date(date);
        self.apply_or_fail(check, |tx| tx.date = date)
    }

    pub fn try_set_description(
        &mut self,
        description: &str,
        notification: &mut Notification,
    ) -> bool {
        let check = Self::validate_description(description);
        self.apply_checked(check, notification, |tx| {
            tx.description = description.trim().to_string()
        })
    }

    pub fn set_description(&mut self, description: &str) -> ResultEngine<()> {
        let check = Self::validate_description(description);
        self.apply_or_fail(check, |tx| {
            tx.description = description.trim().to_string()
        })
    }

    pub fn try_set_amount(&mut self, amount_minor: i64, notification: &mut Notification) -> bool {
        let check = Self::validate_amount(amount_minor);
        self.apply_checked(check, notification, |tx| tx.amount_minor = amount_minor)
    }

    pub fn set_amount(&mut self, amount_minor: i64) -> ResultEngine<()> {
        let check = Self::validate_amount(amount_minor);
        self.apply_or_fail(check, |tx| tx.amount_minor = amount_minor)
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
        self.meta.touch();
    }

    /// Soft delete. Calling it again only refreshes `updated_at`.
    pub fn mark_deleted(&mut self) {
        self.meta.mark_deleted();
    }

    fn apply_checked<F>(&mut self, check: Notification, notification: &mut Notification, apply: F) -> bool
    where
        F: FnOnce(&mut Self),
    {
        if !check.is_valid() {
            notification.merge(check);
            return false;
        }
        apply(self);
        self.meta.touch();
        true
    }

    fn apply_or_fail<F>(&mut self, check: Notification, apply: F) -> ResultEngine<()>
    where
        F: FnOnce(&mut Self),
    {
        if !check.is_valid() {
            return Err(EngineError::Validation(check));
        }
        apply(self);
        self.meta.touch();
        Ok(())
    }
}

impl DomainEntity for Transaction {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub date: DateTimeUtc,
    pub description: String,
    pub amount_minor: i64,
    pub user_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.meta.id().to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            date: ActiveValue::Set(tx.date),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            created_at: ActiveValue::Set(tx.meta.created_at()),
            updated_at: ActiveValue::Set(tx.meta.updated_at()),
            deleted: ActiveValue::Set(tx.meta.is_deleted()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Ok(Self {
            meta: EntityMeta::restore(id, model.created_at, model.updated_at, model.deleted),
            kind: TransactionKind::try_from(model.kind.as_str())?,
            date: model.date,
            description: model.description,
            amount_minor: model.amount_minor,
            user_id: model.user_id,
        })
    }
}
