//! Handles settings for the application.
//!
//! Configuration is read from `settings.toml` (or the file named by
//! `LEDGER_CONFIG`) and can be overridden with `LEDGER__SECTION__KEY`
//! environment variables, e.g. `LEDGER__SERVER__PORT=8080`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
    /// Any sea-orm connection URL, e.g. `postgres://...`.
    Url(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
    pub connect_timeout_ms: u64,
    pub acquire_timeout_ms: u64,
    pub max_connections: u32,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5001,
            database: Database::Sqlite("ledger.db".to_string()),
            connect_timeout_ms: 5_000,
            acquire_timeout_ms: 5_000,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub statement_timeout_ms: u64,
    pub enforce_owner_on_delete: bool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            statement_timeout_ms: 5_000,
            enforce_owner_on_delete: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Global,
    ClientIp,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnStoreError {
    FailOpen,
    FailClosed,
}

#[derive(Debug, Deserialize)]
pub struct RestStore {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterStore {
    Memory,
    Rest(RestStore),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Admission {
    pub enabled: bool,
    pub max_requests: u64,
    pub window_secs: u64,
    pub timeout_ms: u64,
    pub prefix: String,
    pub scope: Scope,
    pub global_key: String,
    pub trust_forwarded_for: bool,
    pub on_store_error: OnStoreError,
    pub store: CounterStore,
}

impl Default for Admission {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 60,
            timeout_ms: 1_000,
            prefix: "ledger-rate-limit".to_string(),
            scope: Scope::Global,
            global_key: "my-rate-limit".to_string(),
            trust_forwarded_for: false,
            on_store_error: OnStoreError::FailClosed,
            store: CounterStore::Memory,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub ledger: Ledger,
    pub admission: Admission,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix("LEDGER").prefix_separator("__").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
