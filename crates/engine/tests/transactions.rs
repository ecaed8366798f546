use chrono::{DateTime, Duration, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    CreateTransactionCmd, Engine, Entity as _, FailureKind, RegisterUserCmd, TransactionKind,
    UpdateTransactionCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn register(engine: &Engine, username: &str) -> String {
    let cmd = RegisterUserCmd::new(username, format!("{username}@example.com"), "password123");
    engine.register(cmd).await.data().unwrap().to_string()
}

fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

#[tokio::test]
async fn add_then_get_returns_same_fields() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let date = days_ago(3);

    let outcome = engine
        .transactions()
        .add(
            CreateTransactionCmd::new(2, date, "Groceries", 4250),
            Some(&alice),
        )
        .await;
    assert!(outcome.is_success());
    assert_eq!(outcome.message(), Some("transaction created successfully"));
    let id = *outcome.data().unwrap();

    let tx = engine
        .transactions()
        .get_by_id(id, Some(&alice))
        .await
        .into_result()
        .unwrap();
    assert_eq!(tx.kind(), TransactionKind::Expense);
    assert_eq!(tx.date().timestamp(), date.timestamp());
    assert_eq!(tx.description(), "Groceries");
    assert_eq!(tx.amount_minor(), 4250);
    assert_eq!(tx.user_id(), Some(alice.as_str()));
}

#[tokio::test]
async fn add_reports_every_invalid_field() {
    let (engine, _db) = engine_with_db().await;

    let cmd = CreateTransactionCmd {
        kind: None,
        date: Some(Utc::now() + Duration::days(1)),
        description: Some("   ".to_string()),
        amount_minor: Some(-1),
    };
    let outcome = engine.transactions().add(cmd, None).await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Validation);
    let keys: Vec<&str> = failure.errors.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, ["Type", "Date", "Description", "Amount"]);
}

#[tokio::test]
async fn add_rejects_unknown_kind_code() {
    let (engine, _db) = engine_with_db().await;

    let outcome = engine
        .transactions()
        .add(CreateTransactionCmd::new(7, days_ago(1), "Gift", 100), None)
        .await;
    assert_eq!(outcome.message(), Some("invalid transaction type"));
    assert_eq!(outcome.errors().len(), 1);
}

#[tokio::test]
async fn add_rejects_transactions_older_than_five_years() {
    let (engine, _db) = engine_with_db().await;

    let outcome = engine
        .transactions()
        .add(
            CreateTransactionCmd::new(1, days_ago(6 * 366), "Old salary", 100),
            None,
        )
        .await;
    assert!(!outcome.is_success());
    assert!(
        outcome
            .errors()
            .iter()
            .any(|e| e.message == "transaction older than 5 years not allowed")
    );
}

#[tokio::test]
async fn update_reports_both_amount_and_date() {
    let (engine, _db) = engine_with_db().await;
    let id = *engine
        .transactions()
        .add(CreateTransactionCmd::new(1, days_ago(2), "Salary", 1000), None)
        .await
        .data()
        .unwrap();

    let outcome = engine
        .transactions()
        .update(
            id,
            UpdateTransactionCmd::new(1, Utc::now() + Duration::days(2), "Salary", 0),
            None,
        )
        .await;
    assert_eq!(outcome.errors().len(), 2);

    // Nothing was written.
    let tx = engine.transactions().get_by_id(id, None).await.into_result().unwrap();
    assert_eq!(tx.amount_minor(), 1000);
    assert!(tx.meta().updated_at().is_none());
}

#[tokio::test]
async fn update_replaces_fields_and_stamps_update_time() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let id = *engine
        .transactions()
        .add(
            CreateTransactionCmd::new(1, days_ago(2), "Salary", 1000),
            Some(&alice),
        )
        .await
        .data()
        .unwrap();

    let outcome = engine
        .transactions()
        .update(
            id,
            UpdateTransactionCmd::new(2, days_ago(1), "  Rent ", 800),
            Some(&alice),
        )
        .await;
    assert!(outcome.is_success());

    let tx = engine
        .transactions()
        .get_by_id(id, Some(&alice))
        .await
        .into_result()
        .unwrap();
    assert_eq!(tx.kind(), TransactionKind::Expense);
    assert_eq!(tx.description(), "Rent");
    assert_eq!(tx.amount_minor(), 800);
    assert!(tx.meta().updated_at().is_some());
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let outcome = engine
        .transactions()
        .update(
            Uuid::new_v4(),
            UpdateTransactionCmd::new(1, days_ago(1), "Salary", 1000),
            None,
        )
        .await;
    assert_eq!(outcome.failure().map(|f| f.kind), Some(FailureKind::NotFound));
    assert_eq!(outcome.message(), Some("transaction not found"));
}

#[tokio::test]
async fn delete_twice_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let id = *engine
        .transactions()
        .add(CreateTransactionCmd::new(2, days_ago(1), "Coffee", 300), None)
        .await
        .data()
        .unwrap();

    let first = engine.transactions().delete(id, None).await;
    assert_eq!(first.message(), Some("transaction deleted successfully"));

    let second = engine.transactions().delete(id, None).await;
    assert_eq!(second.failure().map(|f| f.kind), Some(FailureKind::NotFound));

    let get = engine.transactions().get_by_id(id, None).await;
    assert!(!get.is_success());
    let all = engine.transactions().get_all(None).await.into_result().unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn transactions_are_scoped_to_their_owner() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let id = *engine
        .transactions()
        .add(
            CreateTransactionCmd::new(1, days_ago(1), "Salary", 1000),
            Some(&alice),
        )
        .await
        .data()
        .unwrap();

    let get = engine.transactions().get_by_id(id, Some(&bob)).await;
    assert_eq!(get.message(), Some("transaction not found for this user"));

    let delete = engine.transactions().delete(id, Some(&bob)).await;
    assert_eq!(delete.failure().map(|f| f.kind), Some(FailureKind::NotFound));

    let bob_all = engine.transactions().get_all(Some(&bob)).await;
    assert!(bob_all.data().unwrap().is_empty());
    let alice_all = engine.transactions().get_all(Some(&alice)).await;
    assert_eq!(alice_all.data().unwrap().len(), 1);
}

#[tokio::test]
async fn get_by_type_filters_and_rejects_unknown_codes() {
    let (engine, _db) = engine_with_db().await;
    for (code, amount) in [(1, 1000), (2, 200), (2, 300)] {
        engine
            .transactions()
            .add(CreateTransactionCmd::new(code, days_ago(1), "entry", amount), None)
            .await;
    }

    let expenses = engine.transactions().get_by_type(2, None).await.into_result().unwrap();
    assert_eq!(expenses.len(), 2);
    assert!(expenses.iter().all(|tx| tx.kind() == TransactionKind::Expense));

    let invalid = engine.transactions().get_by_type(0, None).await;
    assert_eq!(invalid.failure().map(|f| f.kind), Some(FailureKind::Validation));
    assert_eq!(invalid.message(), Some("invalid transaction type"));
}

#[tokio::test]
async fn get_by_period_checks_range_and_bounds() {
    let (engine, _db) = engine_with_db().await;
    for days in [1, 5, 20] {
        engine
            .transactions()
            .add(CreateTransactionCmd::new(1, days_ago(days), "entry", 100), None)
            .await;
    }

    let today = Utc::now().date_naive();
    let start = today - Duration::days(5);
    let found = engine
        .transactions()
        .get_by_period(start, today, None)
        .await
        .into_result()
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found[0].date() <= found[1].date());

    let reversed = engine.transactions().get_by_period(today, start, None).await;
    assert_eq!(reversed.message(), Some("start date cannot be after end date"));

    let too_long = engine
        .transactions()
        .get_by_period(today - Duration::days(400), today, None)
        .await;
    assert_eq!(too_long.message(), Some("query period cannot exceed 1 year"));
}

#[tokio::test]
async fn get_by_period_accepts_exactly_366_days() {
    let (engine, _db) = engine_with_db().await;
    let today = Utc::now().date_naive();

    let year = engine
        .transactions()
        .get_by_period(today - Duration::days(366), today, None)
        .await;
    assert!(year.is_success());

    let longer = engine
        .transactions()
        .get_by_period(today - Duration::days(367), today, None)
        .await;
    assert_eq!(longer.failure().map(|f| f.kind), Some(FailureKind::Validation));
    assert_eq!(longer.message(), Some("query period cannot exceed 1 year"));
}
