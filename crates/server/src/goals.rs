//! Goal endpoints: creation, reads, contributions and manual release.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::contribution::{ContributionNew, ContributionReceipt};
use api_types::goal::{GoalNew, GoalView, GoalsResponse, ScheduleNew};
use api_types::release::ReleaseOutcome;
use ledger::{ContributionSchedule, MoneyMinor};

use crate::{
    ServerError,
    server::{ServerState, UserIdent},
    views,
};

fn schedule_from_payload(payload: ScheduleNew) -> ContributionSchedule {
    let mut schedule = ContributionSchedule::new(
        views::engine_frequency(payload.frequency),
        payload.amount_minor.map(MoneyMinor::new),
    );
    schedule.custom_dates = payload.custom_dates.unwrap_or_default();
    schedule
}

pub async fn create(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalView>), ServerError> {
    let schedule = payload.schedule.map(schedule_from_payload);
    let goal = state
        .engine
        .create_goal(
            &user.0,
            &payload.name,
            MoneyMinor::new(payload.target_minor),
            schedule,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(views::goal_view(goal))))
}

pub async fn list(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
) -> Result<Json<GoalsResponse>, ServerError> {
    let goals = state.engine.list_goals_for_user(&user.0).await?;
    Ok(Json(GoalsResponse {
        goals: goals.into_iter().map(views::goal_view).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state.engine.goal(id).await?;
    Ok(Json(views::goal_view(goal)))
}

pub async fn contribute(
    Extension(user): Extension<UserIdent>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContributionNew>,
) -> Result<Json<ContributionReceipt>, ServerError> {
    let receipt = state
        .engine
        .contribute_to_goal(
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
    let outcome = state.engine.release_goal_funds(id).await?;
    Ok(Json(views::release_view(outcome)))
}
