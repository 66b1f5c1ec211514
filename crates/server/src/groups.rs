//! Group endpoints: creation, reads, joining, contributions and release.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::contribution::{ContributionNew, ContributionReceipt};
use api_types::group::{GroupNew, GroupView, MembersResponse};
use api_types::release::ReleaseOutcome;
use ledger::MoneyMinor;

use crate::{
    ServerError,
    server::{ServerState, UserIdent},
    views,
};

pub async fn create(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state
        .engine
        .create_group(
            &user.0,
            &payload.name,
            MoneyMinor::new(payload.target_minor),
            &payload.member_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(views::group_view(group))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(id).await?;
    Ok(Json(views::group_view(group)))
}

/// Joins the calling user and answers with the group's roster.
pub async fn join(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    state.engine.join_group(id, &user.0).await?;
    let members = state.engine.group_members(id).await?;

    Ok(Json(MembersResponse {
        members: members.into_iter().map(views::member_view).collect(),
    }))
}

pub async fn contribute(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContributionNew>,
) -> Result<Json<ContributionReceipt>, ServerError> {
    let receipt = state
        .engine
        .contribute_to_group(
            &user.0,
            id,
            MoneyMinor::new(payload.amount_minor),
            payload.description.as_deref(),
        )
        .await?;

    Ok(Json(views::receipt_view(receipt)))
}

pub async fn release(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReleaseOutcome>, ServerError> {
    let outcome = state.engine.release_group_funds(id).await?;
    Ok(Json(views::release_view(outcome)))
}
