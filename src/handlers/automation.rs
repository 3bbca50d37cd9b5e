use crate::schemas::{Actor, ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use common::{AutomationRunSummary, TaskOutcome};
use compute::automation::run_automation as run_automation_op;
use model::entities::automation_run;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

/// One recorded automation run with its per-task outcomes
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AutomationRunResponse {
    pub id: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub triggered_by: String,
    pub outcomes: Vec<TaskOutcome>,
}

impl TryFrom<automation_run::Model> for AutomationRunResponse {
    type Error = compute::LedgerError;

    fn try_from(model: automation_run::Model) -> Result<Self, Self::Error> {
        let outcomes: Vec<TaskOutcome> = if model.task_results.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&model.task_results)?
        };
        Ok(Self {
            id: model.id,
            started_at: model.started_at,
            finished_at: model.finished_at,
            triggered_by: model.triggered_by,
            outcomes,
        })
    }
}

/// Query parameters for listing automation runs
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRunsQuery {
    /// Maximum number of runs to return, newest first
    pub limit: Option<u64>,
}

/// Trigger an automation run
///
/// Executes the routine back-office tasks (tier progression, overdue
/// scan, campaign ROI refresh, period closing) with per-task isolation:
/// one failing task is recorded and does not stop the others.
#[utoipa::path(
    post,
    path = "/api/v1/automation/runs",
    tag = "automation",
    responses(
        (status = 200, description = "Automation run completed", body = ApiResponse<AutomationRunSummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn run_automation(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<ApiResponse<AutomationRunSummary>>, ApiError> {
    let today = Utc::now().date_naive();
    let summary = run_automation_op(&state.db, &actor.0, today).await?;

    // Period closing and the overdue scan may have written to the ledger
    // and the sub-ledgers.
    state.cache.invalidate_all();

    let failed = summary.outcomes.iter().filter(|o| !o.success).count();
    info!(
        run_id = summary.run_id,
        tasks = summary.outcomes.len(),
        failed,
        "Automation run finished"
    );

    Ok(Json(ApiResponse::new(summary, "Automation run completed")))
}

/// Get recorded automation runs, newest first
#[utoipa::path(
    get,
    path = "/api/v1/automation/runs",
    tag = "automation",
    params(ListRunsQuery),
    responses(
        (status = 200, description = "Runs retrieved successfully", body = ApiResponse<Vec<AutomationRunResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_automation_runs(
    State(state): State<AppState>,
    Query(query): Query<ListRunsQuery>,
) -> Result<Json<ApiResponse<Vec<AutomationRunResponse>>>, ApiError> {
    let mut finder = automation_run::Entity::find()
        .order_by_desc(automation_run::Column::StartedAt)
        .order_by_desc(automation_run::Column::Id);
    if let Some(limit) = query.limit {
        finder = finder.limit(limit);
    }

    let runs = finder.all(&state.db).await?;
    debug!("Retrieved {} automation runs", runs.len());

    let responses = runs
        .into_iter()
        .map(AutomationRunResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(ApiResponse::new(
        responses,
        "Runs retrieved successfully",
    )))
}
