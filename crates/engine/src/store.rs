//! Persistence seam for transactions.
//!
//! Every read excludes soft-deleted rows.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ActiveValue, DatabaseConnection, QueryFilter, QueryOrder, Select, prelude::*};
use uuid::Uuid;

use crate::{
    Entity as _, ResultEngine, Transaction, TransactionKind,
    money::{checked_add, checked_sub},
    transactions,
};

/// Net balance (income minus expense) of one user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserBalance {
    pub user_id: String,
    pub balance_minor: i64,
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> ResultEngine<Option<Transaction>>;

    async fn get_all(&self, user_id: Option<&str>) -> ResultEngine<Vec<Transaction>>;

    /// Rows whose calendar date (UTC) lies in `[start, end]`.
    async fn get_by_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user_id: Option<&str>,
    ) -> ResultEngine<Vec<Transaction>>;

    async fn get_by_type(
        &self,
        kind: TransactionKind,
        user_id: Option<&str>,
    ) -> ResultEngine<Vec<Transaction>>;

    async fn add(&self, tx: &Transaction) -> ResultEngine<Uuid>;

    async fn update(&self, tx: &Transaction) -> ResultEngine<()>;

    /// Persist the deletion marker of an entity already marked deleted.
    async fn soft_delete(&self, tx: &Transaction) -> ResultEngine<()>;

    async fn exists(&self, id: Uuid, user_id: Option<&str>) -> ResultEngine<bool>;

    /// Balance of every user owning at least one transaction.
    ///
    /// Fails with `AmountOverflow` when a balance does not fit in `i64`.
    async fn balances_by_user(&self) -> ResultEngine<Vec<UserBalance>>;
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn visible(self) -> Self;
    fn owned_by(self, user_id: Option<&str>) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn visible(self) -> Self {
        self.filter(transactions::Column::Deleted.eq(false))
    }

    fn owned_by(self, user_id: Option<&str>) -> Self {
        match user_id {
            Some(user_id) => self.filter(transactions::Column::UserId.eq(user_id)),
            None => self,
        }
    }
}

fn ordered(query: Select<transactions::Entity>) -> Select<transactions::Entity> {
    query
        .order_by_asc(transactions::Column::Date)
        .order_by_asc(transactions::Column::Id)
}

fn into_domain(models: Vec<transactions::Model>) -> ResultEngine<Vec<Transaction>> {
    models.into_iter().map(Transaction::try_from).collect()
}

/// [`TransactionStore`] backed by a sea-orm connection.
#[derive(Clone, Debug)]
pub struct SeaOrmTransactionStore {
    database: DatabaseConnection,
}

impl SeaOrmTransactionStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl TransactionStore for SeaOrmTransactionStore {
    async fn get_by_id(&self, id: Uuid) -> ResultEngine<Option<Transaction>> {
        transactions::Entity::find_by_id(id.to_string())
            .visible()
            .one(&self.database)
            .await?
            .map(Transaction::try_from)
            .transpose()
    }

    async fn get_all(&self, user_id: Option<&str>) -> ResultEngine<Vec<Transaction>> {
        let query = transactions::Entity::find().visible().owned_by(user_id);
        into_domain(ordered(query).all(&self.database).await?)
    }

    async fn get_by_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user_id: Option<&str>,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find().visible().owned_by(user_id);
        // Unbounded ends skip the filter instead of encoding extreme dates.
        if start > NaiveDate::MIN {
            let from = start.and_time(NaiveTime::MIN).and_utc();
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(next_day) = end.succ_opt() {
            let to = next_day.and_time(NaiveTime::MIN).and_utc();
            query = query.filter(transactions::Column::Date.lt(to));
        }
        into_domain(ordered(query).all(&self.database).await?)
    }

    async fn get_by_type(
        &self,
        kind: TransactionKind,
        user_id: Option<&str>,
    ) -> ResultEngine<Vec<Transaction>> {
        let query = transactions::Entity::find()
            .visible()
            .owned_by(user_id)
            .filter(transactions::Column::Kind.eq(kind.as_str()));
        into_domain(ordered(query).all(&self.database).await?)
    }

    async fn add(&self, tx: &Transaction) -> ResultEngine<Uuid> {
        transactions::ActiveModel::from(tx)
            .insert(&self.database)
            .await?;
        Ok(tx.id())
    }

    async fn update(&self, tx: &Transaction) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx)
            .update(&self.database)
            .await?;
        Ok(())
    }

    async fn soft_delete(&self, tx: &Transaction) -> ResultEngine<()> {
        let active = transactions::ActiveModel {
            id: ActiveValue::Set(tx.id().to_string()),
            deleted: ActiveValue::Set(true),
            updated_at: ActiveValue::Set(tx.meta().updated_at()),
            ..Default::default()
        };
        active.update(&self.database).await?;
        Ok(())
    }

    async fn exists(&self, id: Uuid, user_id: Option<&str>) -> ResultEngine<bool> {
        let found = transactions::Entity::find_by_id(id.to_string())
            .visible()
            .owned_by(user_id)
            .one(&self.database)
            .await?;
        Ok(found.is_some())
    }

    async fn balances_by_user(&self) -> ResultEngine<Vec<UserBalance>> {
        let rows = transactions::Entity::find()
            .visible()
            .filter(transactions::Column::UserId.is_not_null())
            .all(&self.database)
            .await?;

        let mut balances: BTreeMap<String, i64> = BTreeMap::new();
        for row in into_domain(rows)? {
            let Some(user_id) = row.user_id() else {
                continue;
            };
            let balance = balances.entry(user_id.to_string()).or_insert(0);
            *balance = match row.kind() {
                TransactionKind::Income => checked_add(*balance, row.amount_minor())?,
                TransactionKind::Expense => checked_sub(*balance, row.amount_minor())?,
            };
        }

        Ok(balances
            .into_iter()
            .map(|(user_id, balance_minor)| UserBalance {
                user_id,
                balance_minor,
            })
            .collect())
    }
}
