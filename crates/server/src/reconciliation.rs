//! Manual reconciliation trigger and status read-out.

use axum::{Json, extract::State};

use api_types::reconciliation::{ReconcilerStatus, SweepReport};

use crate::{ServerError, server::ServerState, views};

pub async fn run(State(state): State<ServerState>) -> Result<Json<SweepReport>, ServerError> {
    let report = state.reconciler.run_once().await?;
    Ok(Json(views::sweep_report_view(report)))
}

pub async fn status(State(state): State<ServerState>) -> Json<ReconcilerStatus> {
    Json(views::reconciler_status_view(state.reconciler.status().await))
}
