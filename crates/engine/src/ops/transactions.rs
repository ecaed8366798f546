//! Transaction use cases.
//!
//! Input goes through two layers of checks: command validation
//! ([`crate::validation`]) and the entity rules of [`Transaction`]. Both end
//! up in the same error list of the returned [`Outcome`].

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, Notification, Outcome, Transaction, TransactionKind, TransactionStore,
    UpdateTransactionCmd, transactions::MSG_INVALID_TYPE, validation,
};

use super::{MSG_VALIDATION_FAILED, internal};

/// Longest period accepted by [`TransactionService::get_by_period`], in days.
pub const MAX_PERIOD_DAYS: i64 = 366;

fn not_found<T>(user_id: Option<&str>) -> Outcome<T> {
    match user_id {
        Some(_) => Outcome::not_found("transaction not found for this user"),
        None => Outcome::not_found("transaction not found"),
    }
}

fn is_visible_to(tx: &Transaction, user_id: Option<&str>) -> bool {
    match user_id {
        Some(user_id) => tx.user_id() == Some(user_id),
        None => true,
    }
}

pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    pub async fn get_by_id(&self, id: Uuid, user_id: Option<&str>) -> Outcome<Transaction> {
        match self.store.get_by_id(id).await {
            Ok(Some(tx)) if is_visible_to(&tx, user_id) => Outcome::ok(tx),
            Ok(_) => not_found(user_id),
            Err(err) => internal("error retrieving transaction", err),
        }
    }

    /// Every visible transaction; an empty list is still a success.
    pub async fn get_all(&self, user_id: Option<&str>) -> Outcome<Vec<Transaction>> {
        match self.store.get_all(user_id).await {
            Ok(txs) => Outcome::ok(txs),
            Err(err) => internal("error retrieving transactions", err),
        }
    }

    /// Transactions dated in `[start, end]`.
    ///
    /// The range is checked before the store is queried.
    pub async fn get_by_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user_id: Option<&str>,
    ) -> Outcome<Vec<Transaction>> {
        if start > end {
            return Outcome::invalid("start date cannot be after end date");
        }
        if (end - start).num_days() > MAX_PERIOD_DAYS {
            return Outcome::invalid("query period cannot exceed 1 year");
        }

        match self.store.get_by_period(start, end, user_id).await {
            Ok(txs) => Outcome::ok(txs),
            Err(err) => internal("error retrieving transactions by period", err),
        }
    }

    pub async fn get_by_type(&self, code: i32, user_id: Option<&str>) -> Outcome<Vec<Transaction>> {
        let Some(kind) = TransactionKind::from_code(code) else {
            return Outcome::invalid(MSG_INVALID_TYPE);
        };

        match self.store.get_by_type(kind, user_id).await {
            Ok(txs) => Outcome::ok(txs),
            Err(err) => internal("error retrieving transactions by type", err),
        }
    }

    pub async fn add(&self, cmd: CreateTransactionCmd, user_id: Option<&str>) -> Outcome<Uuid> {
        let notification = validation::validate_create(&cmd);
        if !notification.is_valid() {
            tracing::warn!("rejected transaction: {notification}");
            return Outcome::invalid_with_errors(MSG_VALIDATION_FAILED, notification);
        }

        let (Some(code), Some(date), Some(description), Some(amount_minor)) =
            (cmd.kind, cmd.date, cmd.description, cmd.amount_minor)
        else {
            return Outcome::invalid(MSG_VALIDATION_FAILED);
        };

        let mut notification = Notification::new();
        let Some(kind) = TransactionKind::parse_code(code, &mut notification) else {
            return Outcome::invalid_with_errors(MSG_INVALID_TYPE, notification);
        };

        let tx = Transaction::new_checked(
            kind,
            date,
            &description,
            amount_minor,
            user_id.map(ToString::to_string),
            &mut notification,
        );
        if !notification.is_valid() {
            tracing::warn!("rejected transaction: {notification}");
            return Outcome::invalid_with_errors(MSG_VALIDATION_FAILED, notification);
        }

        match self.store.add(&tx).await {
            Ok(id) => {
                tracing::info!("transaction {id} created");
                Outcome::ok_with_message(id, "transaction created successfully")
            }
            Err(err) => internal("error creating transaction", err),
        }
    }

    /// Replace the business fields of a transaction.
    ///
    /// All four fields go through one notification so every failure is
    /// reported; nothing is persisted unless all of them pass.
    pub async fn update(
        &self,
        id: Uuid,
        cmd: UpdateTransactionCmd,
        user_id: Option<&str>,
    ) -> Outcome<()> {
        let notification = validation::validate_update(&cmd);
        if !notification.is_valid() {
            tracing::warn!("rejected update of {id}: {notification}");
            return Outcome::invalid_with_errors(MSG_VALIDATION_FAILED, notification);
        }

        let (Some(code), Some(date), Some(description), Some(amount_minor)) =
            (cmd.kind, cmd.date, cmd.description, cmd.amount_minor)
        else {
            return Outcome::invalid(MSG_VALIDATION_FAILED);
        };

        let mut notification = Notification::new();
        let Some(kind) = TransactionKind::parse_code(code, &mut notification) else {
            return Outcome::invalid_with_errors(MSG_INVALID_TYPE, notification);
        };

        let mut tx = match self.store.get_by_id(id).await {
            Ok(Some(tx)) if is_visible_to(&tx, user_id) => tx,
            Ok(_) => return not_found(user_id),
            Err(err) => return internal("error updating transaction", err),
        };

        tx.try_set_kind(kind, &mut notification);
        tx.try_set_date(date, &mut notification);
        tx.try_set_description(&description, &mut notification);
        tx.try_set_amount(amount_minor, &mut notification);
        if !notification.is_valid() {
            tracing::warn!("rejected update of {id}: {notification}");
            return Outcome::invalid_with_errors(MSG_VALIDATION_FAILED, notification);
        }

        if let Some(user_id) = user_id {
            tx.set_user_id(Some(user_id.to_string()));
        }

        match self.store.update(&tx).await {
            Ok(()) => {
                tracing::info!("transaction {id} updated");
                Outcome::ok_with_message((), "transaction updated successfully")
            }
            Err(err) => internal("error updating transaction", err),
        }
    }

    /// Soft delete. A second call on the same id is "not found".
    pub async fn delete(&self, id: Uuid, user_id: Option<&str>) -> Outcome<()> {
        match self.store.exists(id, user_id).await {
            Ok(true) => {}
            Ok(false) => return not_found(user_id),
            Err(err) => return internal("error deleting transaction", err),
        }

        let mut tx = match self.store.get_by_id(id).await {
            Ok(Some(tx)) => tx,
            Ok(None) => return not_found(user_id),
            Err(err) => return internal("error deleting transaction", err),
        };
        tx.mark_deleted();

        match self.store.soft_delete(&tx).await {
            Ok(()) => {
                tracing::info!("transaction {id} deleted");
                Outcome::ok_with_message((), "transaction deleted successfully")
            }
            Err(err) => internal("error deleting transaction", err),
        }
    }
}
