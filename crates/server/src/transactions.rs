//! Transactions API endpoints

use api_types::{
    ApiResult, PeriodQuery,
    transaction::{TransactionCreated, TransactionNew, TransactionUpdate, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::{CreateTransactionCmd, Entity as _, Transaction, UpdateTransactionCmd, User};
use uuid::Uuid;

use crate::{ServerError, respond, server::ServerState};

fn view(tx: &Transaction) -> TransactionView {
    TransactionView {
        id: tx.id(),
        kind: tx.kind().as_str().to_string(),
        kind_code: tx.kind().code(),
        date: tx.date().fixed_offset(),
        description: tx.description().to_string(),
        amount_minor: tx.amount_minor(),
        user_id: tx.user_id().map(str::to_string),
        created_at: tx.meta().created_at().fixed_offset(),
        updated_at: tx.meta().updated_at().map(|at| at.fixed_offset()),
    }
}

fn views(txs: Vec<Transaction>) -> Vec<TransactionView> {
    txs.iter().map(view).collect()
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResult<Vec<TransactionView>>>, ServerError> {
    let user_id = user.id.to_string();
    let outcome = state.engine.transactions().get_all(Some(&user_id)).await;
    respond(outcome, views)
}

pub async fn list_by_period(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(period): Query<PeriodQuery>,
) -> Result<Json<ApiResult<Vec<TransactionView>>>, ServerError> {
    let user_id = user.id.to_string();
    let outcome = state
        .engine
        .transactions()
        .get_by_period(period.start, period.end, Some(&user_id))
        .await;
    respond(outcome, views)
}

pub async fn list_by_type(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(code): Path<i32>,
) -> Result<Json<ApiResult<Vec<TransactionView>>>, ServerError> {
    let user_id = user.id.to_string();
    let outcome = state
        .engine
        .transactions()
        .get_by_type(code, Some(&user_id))
        .await;
    respond(outcome, views)
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResult<TransactionView>>, ServerError> {
    let user_id = user.id.to_string();
    let outcome = state
        .engine
        .transactions()
        .get_by_id(id, Some(&user_id))
        .await;
    respond(outcome, |tx| view(&tx))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResult<TransactionCreated>>), ServerError> {
    let Json(payload) = payload?;
    let cmd = CreateTransactionCmd {
        kind: payload.kind,
        date: payload.date.map(|date| date.with_timezone(&Utc)),
        description: payload.description,
        amount_minor: payload.amount_minor,
    };

    let user_id = user.id.to_string();
    let outcome = state.engine.transactions().add(cmd, Some(&user_id)).await;
    let body = respond(outcome, |id| TransactionCreated { id })?;
    Ok((StatusCode::CREATED, body))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<Json<ApiResult<()>>, ServerError> {
    let Json(payload) = payload?;
    let cmd = UpdateTransactionCmd {
        kind: payload.kind,
        date: payload.date.map(|date| date.with_timezone(&Utc)),
        description: payload.description,
        amount_minor: payload.amount_minor,
    };

    let user_id = user.id.to_string();
    let outcome = state
        .engine
        .transactions()
        .update(id, cmd, Some(&user_id))
        .await;
    respond(outcome, |()| ())
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResult<()>>, ServerError> {
    let user_id = user.id.to_string();
    let outcome = state.engine.transactions().delete(id, Some(&user_id)).await;
    respond(outcome, |()| ())
}
