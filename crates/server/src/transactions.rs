//! Transactions API endpoints

use std::num::IntErrorKind;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::TypedHeader;
use engine::EngineError;

use crate::{
    ServerError,
    server::{ServerState, UserIdHeader},
    types::{SummaryView, TransactionDeleted, TransactionNew, TransactionView},
};

pub async fn list(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let transactions = state.engine.list_transactions(&user_id).await?;

    Ok(Json(
        transactions.into_iter().map(TransactionView::from).collect(),
    ))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let Json(payload) = payload.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    let tx = state.engine.create_transaction(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(tx.into())))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    owner: Option<TypedHeader<UserIdHeader>>,
) -> Result<Json<TransactionDeleted>, ServerError> {
    let id: i32 = match id.parse() {
        Ok(id) => id,
        // Numeric but wider than the id column: no such row can exist.
        Err(err) if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            return Err(EngineError::NotFound(format!("transaction {id}")).into());
        }
        Err(_) => {
            return Err(EngineError::Validation(format!("invalid transaction id: {id}")).into());
        }
    };

    let owner = if state.options.enforce_owner_on_delete {
        let Some(TypedHeader(UserIdHeader(user_id))) = owner else {
            return Err(ServerError::Unauthorized(
                "x-user-id header required".to_string(),
            ));
        };
        Some(user_id)
    } else {
        None
    };

    state.engine.delete_transaction(id, owner.as_deref()).await?;

    Ok(Json(TransactionDeleted {
        message: "Transaction deleted successfully".to_string(),
        id,
    }))
}

pub async fn summary(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<SummaryView>, ServerError> {
    let summary = state.engine.summarize(&user_id).await?;

    Ok(Json(summary.into()))
}
