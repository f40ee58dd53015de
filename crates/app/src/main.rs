use std::{sync::Arc, time::Duration};

use gate::{AdmissionGate, CounterStore, GatePolicy, MemoryCounterStore, RestCounterStore};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use server::{KeyScope, ServerOptions, ServerState, StoreErrorPolicy};
use settings::Database;

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledgerd={level},server={level},engine={level},gate={level}",
            level = settings.app.level
        ))
        .init();

    // Never serve against a store whose schema could not be verified.
    let db = match connect_database(&settings.server).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Err(err);
        }
    };
    tracing::info!("database initialized successfully");

    let mut engine = engine::Engine::builder().database(db);
    if settings.ledger.statement_timeout_ms > 0 {
        engine = engine.statement_timeout(Duration::from_millis(settings.ledger.statement_timeout_ms));
    }
    let engine = engine.build().await?;

    let gate = build_gate(&settings.admission)?;
    let options = ServerOptions {
        scope: match settings.admission.scope {
            settings::Scope::Global => KeyScope::Global(settings.admission.global_key.clone()),
            settings::Scope::ClientIp => KeyScope::ClientIp,
        },
        on_store_error: match settings.admission.on_store_error {
            settings::OnStoreError::FailOpen => StoreErrorPolicy::FailOpen,
            settings::OnStoreError::FailClosed => StoreErrorPolicy::FailClosed,
        },
        enforce_owner_on_delete: settings.ledger.enforce_owner_on_delete,
        trust_forwarded_for: settings.admission.trust_forwarded_for,
    };
    if options.enforce_owner_on_delete {
        tracing::info!("delete requires the x-user-id of the owner");
    }

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(ServerState::new(engine, gate, options), listener).await?;

    Ok(())
}

async fn connect_database(config: &settings::Server) -> Result<DatabaseConnection, BoxError> {
    let url = match &config.database {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
        Database::Url(url) => url.clone(),
    };

    let mut options = ConnectOptions::new(url);
    options
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
        .sqlx_logging(false);
    // Each in-memory SQLite connection is its own database.
    if matches!(config.database, Database::Memory) {
        options.max_connections(1);
    } else {
        options.max_connections(config.max_connections);
    }

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn build_gate(config: &settings::Admission) -> Result<Option<AdmissionGate>, BoxError> {
    if !config.enabled {
        tracing::warn!("admission control disabled");
        return Ok(None);
    }

    let store: Arc<dyn CounterStore> = match &config.store {
        settings::CounterStore::Memory => {
            tracing::info!("using in-process counter store, limits are per instance");
            Arc::new(MemoryCounterStore::new())
        }
        settings::CounterStore::Rest(rest) => {
            Arc::new(RestCounterStore::new(&rest.url, &rest.token)?)
        }
    };

    let policy = GatePolicy {
        max_requests: config.max_requests,
        window: Duration::from_secs(config.window_secs),
        timeout: Duration::from_millis(config.timeout_ms),
        prefix: config.prefix.clone(),
    };
    tracing::info!(
        "admission: {} requests per {:?}",
        policy.max_requests,
        policy.window
    );
    Ok(Some(AdmissionGate::new(store, policy)?))
}
