use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{EngineError, Outcome, ResultEngine, SeaOrmTransactionStore, TransactionStore};

mod alerts;
mod summary;
mod transactions;
mod users;

pub use summary::{SummaryService, check_period};
pub use transactions::TransactionService;

pub(crate) const MSG_VALIDATION_FAILED: &str = "validation failed";

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Turn an unexpected store failure into an `Internal` outcome.
pub(crate) fn internal<T>(context: &str, err: EngineError) -> Outcome<T> {
    tracing::error!("{context}: {err}");
    Outcome::internal(format!("{context}: {err}"))
}

pub struct Engine {
    database: DatabaseConnection,
    store: Arc<dyn TransactionStore>,
    transactions: TransactionService,
    summary: SummaryService,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn transactions(&self) -> &TransactionService {
        &self.transactions
    }

    pub fn summary(&self) -> &SummaryService {
        &self.summary
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    store: Option<Arc<dyn TransactionStore>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Use a custom transaction store instead of the database-backed one.
    pub fn store(mut self, store: Arc<dyn TransactionStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = self.store.unwrap_or_else(|| {
            Arc::new(SeaOrmTransactionStore::new(self.database.clone()))
        });
        Ok(Engine {
            transactions: TransactionService::new(store.clone()),
            summary: SummaryService::new(store.clone()),
            store,
            database: self.database,
        })
    }
}
