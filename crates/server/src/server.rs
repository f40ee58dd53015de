use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::headers::{Error as AxumError, Header};
use gate::AdmissionGate;

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, transactions};
use engine::{Engine, EngineError};

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

/// Which requests share one admission counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyScope {
    /// Every request counts against the same key.
    Global(String),
    /// One counter per client address. This is the socket peer unless
    /// [`ServerOptions::trust_forwarded_for`] is set.
    ClientIp,
}

/// What to do with a request when the counter store cannot be consulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreErrorPolicy {
    FailOpen,
    FailClosed,
}

#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub scope: KeyScope,
    pub on_store_error: StoreErrorPolicy,
    /// Require `x-user-id` on delete and only delete that user's rows.
    pub enforce_owner_on_delete: bool,
    /// Key [`KeyScope::ClientIp`] on the last `X-Forwarded-For` hop, the one
    /// appended by the reverse proxy in front of the service. Only enable it
    /// behind such a proxy: clients can write the header themselves.
    pub trust_forwarded_for: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            scope: KeyScope::Global("my-rate-limit".to_string()),
            on_store_error: StoreErrorPolicy::FailClosed,
            enforce_owner_on_delete: false,
            trust_forwarded_for: false,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub gate: Option<Arc<AdmissionGate>>,
    pub options: Arc<ServerOptions>,
}

impl ServerState {
    pub fn new(engine: Engine, gate: Option<AdmissionGate>, options: ServerOptions) -> Self {
        Self {
            engine: Arc::new(engine),
            gate: gate.map(Arc::new),
            options: Arc::new(options),
        }
    }
}

/// `TypedHeader` for the authenticated user id.
///
/// The identity provider in front of the service sets "x-user-id"; the value
/// is trusted as given.
#[derive(Debug)]
pub struct UserIdHeader(pub String);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        if value.trim().is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(UserIdHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

fn admission_key(options: &ServerOptions, request: &Request) -> String {
    match &options.scope {
        KeyScope::Global(key) => key.clone(),
        KeyScope::ClientIp => {
            if options.trust_forwarded_for {
                let forwarded = request
                    .headers()
                    .get_all("x-forwarded-for")
                    .iter()
                    .filter_map(|value| value.to_str().ok())
                    .flat_map(|value| value.split(','))
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .next_back();
                if let Some(ip) = forwarded {
                    return ip.to_string();
                }
            }
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string())
        }
    }
}

/// Runs in front of every route. A denied request never reaches a handler.
async fn admission(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(gate) = state.gate.as_ref() else {
        return Ok(next.run(request).await);
    };

    let key = admission_key(&state.options, &request);
    match gate.admit(&key).await {
        Ok(decision) if decision.is_allowed() => Ok(next.run(request).await),
        Ok(decision) => {
            tracing::debug!(
                "rate limited {} {} ({}/{})",
                request.method(),
                request.uri().path(),
                decision.count,
                decision.limit
            );
            Err(ServerError::RateLimited)
        }
        Err(err) => match state.options.on_store_error {
            StoreErrorPolicy::FailOpen => {
                tracing::warn!("admission check failed, letting request through: {err}");
                Ok(next.run(request).await)
            }
            StoreErrorPolicy::FailClosed => {
                tracing::error!("admission check failed, rejecting request: {err}");
                Err(ServerError::GateUnavailable)
            }
        },
    }
}

async fn unknown_route(uri: axum::http::Uri) -> ServerError {
    ServerError::Engine(EngineError::NotFound(format!("route {}", uri.path())))
}

pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/transactions", post(transactions::create))
        .route(
            "/transactions/{key}",
            get(transactions::list).delete(transactions::delete),
        )
        .route("/transactions/summary/{user_id}", get(transactions::summary));

    Router::new()
        .nest("/api", api)
        .fallback(unknown_route)
        .layer(middleware::from_fn_with_state(state.clone(), admission))
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
