use std::{sync::Arc, time::Duration};

use engine::{Engine, Mailer};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod mailer;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledgerly={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;
    let engine = Arc::new(Engine::builder().database(db).build().await?);
    let mailer: Arc<dyn Mailer> = Arc::new(mailer::LogMailer::new(settings.mail.from));

    if let Some(jobs) = settings.jobs {
        let engine = engine.clone();
        let mailer = mailer.clone();
        tasks.spawn(async move {
            tracing::info!(
                "negative balance check every {}s",
                jobs.balance_check_interval_secs
            );
            balance_job(
                engine,
                mailer,
                Duration::from_secs(jobs.balance_check_interval_secs.max(1)),
            )
            .await;
        });
    }

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(engine, mailer, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

/// Mail users with a negative balance, once per tick.
async fn balance_job(engine: Arc<Engine>, mailer: Arc<dyn Mailer>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        balance_check(&engine, &mailer).await;
    }
}

/// One balance check on its own task. A failure or panic is logged and
/// never reaches the caller.
async fn balance_check(engine: &Arc<Engine>, mailer: &Arc<dyn Mailer>) -> Option<usize> {
    let engine = engine.clone();
    let mailer = mailer.clone();
    let check =
        tokio::spawn(async move { engine.notify_negative_balances(mailer.as_ref()).await });

    match check.await {
        Ok(Ok(sent)) => {
            tracing::debug!("balance check done, {sent} notification(s)");
            Some(sent)
        }
        Ok(Err(err)) => {
            tracing::error!("balance check failed: {err}");
            None
        }
        Err(err) => {
            tracing::error!("balance check aborted: {err}");
            None
        }
    }
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use engine::{CreateTransactionCmd, EngineError, MailMessage, RegisterUserCmd};

    use super::*;

    struct PanickingMailer;

    #[async_trait]
    impl Mailer for PanickingMailer {
        async fn send(&self, _message: MailMessage) -> Result<(), EngineError> {
            panic!("mail backend exploded");
        }
    }

    async fn engine_with_negative_balance() -> Arc<Engine> {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();

        let cmd = RegisterUserCmd::new("alice", "alice@example.com", "password123");
        let user_id = engine.register(cmd).await.data().unwrap().to_string();
        let expense =
            CreateTransactionCmd::new(2, Utc::now() - ChronoDuration::days(1), "Rent", 900);
        assert!(engine.transactions().add(expense, Some(&user_id)).await.is_success());
        Arc::new(engine)
    }

    #[tokio::test]
    async fn balance_check_survives_a_panicking_mailer() {
        let engine = engine_with_negative_balance().await;
        let mailer: Arc<dyn Mailer> = Arc::new(PanickingMailer);

        assert_eq!(balance_check(&engine, &mailer).await, None);
        // The job keeps running on the next tick.
        assert_eq!(balance_check(&engine, &mailer).await, None);
    }

    #[tokio::test]
    async fn balance_check_counts_sent_mail() {
        let engine = engine_with_negative_balance().await;
        let mailer: Arc<dyn Mailer> = Arc::new(mailer::LogMailer::new("no-reply@example.com"));

        assert_eq!(balance_check(&engine, &mailer).await, Some(1));
    }
}
