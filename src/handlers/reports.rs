use crate::schemas::{Actor, ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, NaiveDate, Utc};
use common::{DateRange, ReportFigures};
use compute::report::generate_report as generate_report_op;
use compute::LedgerError;
use model::entities::financial_report::{self, ReportType};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for generating a financial report snapshot
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct GenerateReportRequest {
    /// IncomeStatement, BalanceSheet or TrialBalance
    #[schema(value_type = String)]
    pub report_type: ReportType,
    /// First day of the reporting period
    pub period_start: NaiveDate,
    /// Last day of the reporting period
    pub period_end: NaiveDate,
}

/// Stored report snapshot with its parsed figures
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponse {
    pub id: i32,
    #[schema(value_type = String)]
    pub report_type: ReportType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub figures: ReportFigures,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
}

impl TryFrom<financial_report::Model> for ReportResponse {
    type Error = LedgerError;

    fn try_from(model: financial_report::Model) -> Result<Self, Self::Error> {
        let figures: ReportFigures = serde_json::from_str(&model.figures)?;
        Ok(Self {
            id: model.id,
            report_type: model.report_type,
            period_start: model.period_start,
            period_end: model.period_end,
            figures,
            generated_by: model.generated_by,
            generated_at: model.generated_at,
        })
    }
}

/// Query parameters for listing reports
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListReportsQuery {
    /// Only reports of this type
    pub report_type: Option<String>,
}

/// Generate a financial report for a period and store the snapshot
///
/// A balance sheet whose identity does not hold within tolerance is
/// refused; the snapshot is only persisted for a consistent ledger.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "reports",
    request_body = GenerateReportRequest,
    responses(
        (status = 201, description = "Report generated successfully", body = ApiResponse<ReportResponse>),
        (status = 422, description = "Invalid period or unbalanced ledger", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn generate_report(
    State(state): State<AppState>,
    actor: Actor,
    Valid(Json(request)): Valid<Json<GenerateReportRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponse>>), ApiError> {
    debug!(
        "Generating {:?} for {}..{}",
        request.report_type, request.period_start, request.period_end
    );

    let report = generate_report_op(
        &state.db,
        request.report_type,
        DateRange::new(request.period_start, request.period_end),
        &actor.0,
    )
    .await?;

    info!(
        "Report {} ({:?}) generated by {}",
        report.id, report.report_type, report.generated_by
    );
    let response = ReportResponse::try_from(report)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(response, "Report generated successfully")),
    ))
}

/// Get all stored report snapshots
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Reports retrieved successfully", body = ApiResponse<Vec<ReportResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_reports(
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponse>>>, ApiError> {
    let mut finder = financial_report::Entity::find()
        .order_by_desc(financial_report::Column::GeneratedAt);
    if let Some(report_type) = &query.report_type {
        finder = finder.filter(financial_report::Column::ReportType.eq(report_type.as_str()));
    }

    let reports = finder.all(&state.db).await?;
    debug!("Retrieved {} reports", reports.len());

    let responses = reports
        .into_iter()
        .map(ReportResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(ApiResponse::new(
        responses,
        "Reports retrieved successfully",
    )))
}

/// Get a specific stored report snapshot by ID
#[utoipa::path(
    get,
    path = "/api/v1/reports/{report_id}",
    tag = "reports",
    params(("report_id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report retrieved successfully", body = ApiResponse<ReportResponse>),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_report(
    Path(report_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReportResponse>>, ApiError> {
    let report = financial_report::Entity::find_by_id(report_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "financial report",
            id: report_id,
        })?;

    let response = ReportResponse::try_from(report)?;
    Ok(Json(ApiResponse::new(
        response,
        "Report retrieved successfully",
    )))
}
