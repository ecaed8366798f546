//! Schema maintenance for a ledgerly database.

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

#[derive(Debug, Parser)]
#[command(about = "Apply or inspect ledgerly schema migrations")]
struct Cli {
    /// SQLite connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./ledgerly.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Apply every pending migration.
    Up,
    /// Roll back the last `steps` migrations, or all of them.
    Down {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Drop all tables and migrate from scratch.
    Fresh,
    /// List applied and pending migrations.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => Migrator::up(&db, None).await?,
        Command::Down { steps } => Migrator::down(&db, steps).await?,
        Command::Fresh => Migrator::fresh(&db).await?,
        Command::Status => Migrator::status(&db).await?,
    }

    Ok(())
}
