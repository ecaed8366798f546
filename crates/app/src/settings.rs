//! Application settings.
//!
//! Read from a TOML file (`settings.toml` unless `--config` says otherwise)
//! and overridden by `LEDGERLY__<SECTION>__<KEY>` environment variables.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Jobs {
    /// Seconds between two negative balance checks.
    pub balance_check_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Mail {
    pub from: String,
}

impl Default for Mail {
    fn default() -> Self {
        Self {
            from: "no-reply@ledgerly.local".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    pub jobs: Option<Jobs>,
    #[serde(default)]
    pub mail: Mail,
}

#[derive(Debug, Parser)]
#[command(name = "ledgerly", version)]
struct Args {
    /// Config file path (TOML), without or with extension.
    #[arg(long, env = "LEDGERLY_CONFIG")]
    config: Option<String>,
    /// Override the log level.
    #[arg(long)]
    level: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();

        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("LEDGERLY").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(level) = args.level {
            settings.app.level = level;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_settings() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                r#"
                [app]
                level = "debug"

                [server]
                port = 3000
                database = { sqlite = "ledgerly.db" }

                [jobs]
                balance_check_interval_secs = 3600

                [mail]
                from = "alerts@example.com"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "ledgerly.db"));
        assert_eq!(settings.jobs.unwrap().balance_check_interval_secs, 3600);
        assert_eq!(settings.mail.from, "alerts@example.com");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 8080\ndatabase = \"memory\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.app.level, "info");
        assert!(settings.jobs.is_none());
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }
}
