use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{
    KeyScope, ServerOptions, ServerState, StoreErrorPolicy, UserIdHeader, router,
    run_with_listener,
};

mod server;
mod transactions;
pub mod types;

use types::ErrorBody;

pub enum ServerError {
    Engine(EngineError),
    /// Malformed request body.
    BadRequest(String),
    Unauthorized(String),
    RateLimited,
    /// The admission gate could not reach its counter store and the policy
    /// is fail-closed.
    GateUnavailable,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) | EngineError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn kind_for_engine_error(err: &EngineError) -> &'static str {
    match err {
        EngineError::Validation(_) => "validation",
        EngineError::NotFound(_) => "not_found",
        EngineError::Database(_) | EngineError::Timeout(_) => "store",
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    if err.is_store_error() {
        tracing::error!("ledger store error: {err}");
        return "internal server error".to_string();
    }
    err.to_string()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, error) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                kind_for_engine_error(&err),
                message_for_engine_error(err),
            ),
            ServerError::BadRequest(err) => (StatusCode::BAD_REQUEST, "validation", err),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, "unauthorized", err),
            ServerError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "too many requests, please try again later".to_string(),
            ),
            ServerError::GateUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "gate_unavailable",
                "admission control unavailable".to_string(),
            ),
        };

        (
            status,
            Json(ErrorBody {
                error,
                kind: kind.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
