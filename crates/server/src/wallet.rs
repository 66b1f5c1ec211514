//! Wallet endpoints: snapshot, deposits, the transaction listing and the
//! withdrawal approve/reject pair.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::transaction::{
    TransactionCreated, TransactionListQuery, TransactionListResponse, TransactionView,
};
use api_types::wallet::{DepositNew, WalletView};
use api_types::withdrawal::WithdrawalNew;
use ledger::{MoneyMinor, TransactionKind, TransactionListFilter};

use crate::{
    ServerError,
    server::{ServerState, UserIdent},
    views,
};

/// Page size when the query does not ask for one.
const DEFAULT_LIMIT: u64 = 20;
/// Largest page a single request may fetch; bigger asks are clamped.
const MAX_LIMIT: u64 = 100;

pub async fn get(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.get_or_create_wallet(&user.0).await?;
    Ok(Json(views::wallet_view(wallet)))
}

pub async fn deposit(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
    Json(payload): Json<DepositNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let entry = state
        .engine
        .deposit(
            &user.0,
            MoneyMinor::new(payload.amount_minor),
            payload.reference.as_deref(),
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id: entry.id })))
}

pub async fn list_transactions(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let kinds = match &query.kinds {
        None => None,
        Some(raw) => {
            let mut kinds = Vec::new();
            for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                kinds.push(TransactionKind::try_from(token)?);
            }
            Some(kinds)
        }
    };
    let filter = TransactionListFilter {
        from: query.from,
        to: query.to,
        kinds,
        status: query.status.map(views::engine_transaction_status),
        search: query.search,
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let (entries, next_cursor) = state
        .engine
        .list_wallet_transactions_page(&user.0, limit, query.cursor.as_deref(), &filter)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: entries.into_iter().map(views::transaction_view).collect(),
        next_cursor,
    }))
}

pub async fn request_withdrawal(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
    Json(payload): Json<WithdrawalNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let entry = state
        .engine
        .request_withdrawal(
            &user.0,
            MoneyMinor::new(payload.amount_minor),
            &payload.destination,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id: entry.id })))
}

pub async fn approve_withdrawal(
    State(state): State<ServerState>,
    Path(tx_id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let entry = state.engine.approve_withdrawal(tx_id).await?;
    Ok(Json(views::transaction_view(entry)))
}

pub async fn reject_withdrawal(
    State(state): State<ServerState>,
    Path(tx_id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let entry = state.engine.reject_withdrawal(tx_id).await?;
    Ok(Json(views::transaction_view(entry)))
}
