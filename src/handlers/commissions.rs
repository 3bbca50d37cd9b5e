use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use compute::commission::{assign_tier, update_total_sales};
use compute::LedgerError;
use model::entities::sales_commission::{self, CommissionStatus};
use model::entities::commission_tier;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for defining a commission tier
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTierRequest {
    /// Unique tier name, e.g. "silver"
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Sales threshold at which the tier starts to apply (inclusive)
    #[schema(value_type = String)]
    pub min_sales: Decimal,
    /// Commission rate as a fraction, e.g. 0.075
    #[schema(value_type = String)]
    pub rate: Decimal,
}

/// Commission tier response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TierResponse {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String)]
    pub min_sales: Decimal,
    #[schema(value_type = String)]
    pub rate: Decimal,
}

impl From<commission_tier::Model> for TierResponse {
    fn from(model: commission_tier::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            min_sales: model.min_sales,
            rate: model.rate,
        }
    }
}

/// Request body for accruing a sales commission
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCommissionRequest {
    /// Identifier of the salesperson in the upstream system
    pub salesperson_id: i32,
    /// First day of the commission period
    pub period_start: NaiveDate,
    /// Last day of the commission period
    pub period_end: NaiveDate,
    /// Sales total for the period; tier and amount are derived from it
    #[schema(value_type = String)]
    pub total_sales: Decimal,
    /// Overrides the derived commission amount when set
    #[schema(value_type = Option<String>)]
    pub commission_amount: Option<Decimal>,
}

/// Request body for revising a commission's sales total
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateSalesRequest {
    /// Revised sales total; tier, rate and amount are re-derived
    #[schema(value_type = String)]
    pub total_sales: Decimal,
}

/// Sales commission response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommissionResponse {
    pub id: i32,
    pub salesperson_id: i32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[schema(value_type = String)]
    pub total_sales: Decimal,
    pub tier_name: Option<String>,
    #[schema(value_type = String)]
    pub rate: Decimal,
    #[schema(value_type = String)]
    pub commission_amount: Decimal,
    #[schema(value_type = String)]
    pub status: CommissionStatus,
}

impl From<sales_commission::Model> for CommissionResponse {
    fn from(model: sales_commission::Model) -> Self {
        Self {
            id: model.id,
            salesperson_id: model.salesperson_id,
            period_start: model.period_start,
            period_end: model.period_end,
            total_sales: model.total_sales,
            tier_name: model.tier_name,
            rate: model.rate,
            commission_amount: model.commission_amount,
            status: model.status,
        }
    }
}

/// Query parameters for listing commissions
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCommissionsQuery {
    /// Only commissions of this salesperson
    pub salesperson_id: Option<i32>,
    /// Only commissions with this status
    pub status: Option<String>,
}

/// Define a commission tier
#[utoipa::path(
    post,
    path = "/api/v1/commissions/tiers",
    tag = "commissions",
    request_body = CreateTierRequest,
    responses(
        (status = 201, description = "Tier created successfully", body = ApiResponse<TierResponse>),
        (status = 409, description = "Tier name already exists", body = ErrorResponse),
        (status = 422, description = "Invalid tier", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_tier(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateTierRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TierResponse>>), ApiError> {
    if request.min_sales < Decimal::ZERO {
        return Err(LedgerError::Validation("min_sales cannot be negative".to_string()).into());
    }
    if request.rate < Decimal::ZERO || request.rate > Decimal::ONE {
        return Err(LedgerError::Validation(
            "rate must be a fraction between 0 and 1".to_string(),
        )
        .into());
    }

    let tier = commission_tier::ActiveModel {
        name: Set(request.name),
        min_sales: Set(request.min_sales),
        rate: Set(request.rate),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Commission tier {} created", tier.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            TierResponse::from(tier),
            "Tier created successfully",
        )),
    ))
}

/// Get all commission tiers
#[utoipa::path(
    get,
    path = "/api/v1/commissions/tiers",
    tag = "commissions",
    responses(
        (status = 200, description = "Tiers retrieved successfully", body = ApiResponse<Vec<TierResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tiers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TierResponse>>>, ApiError> {
    let tiers = commission_tier::Entity::find()
        .order_by_asc(commission_tier::Column::MinSales)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} commission tiers", tiers.len());

    let responses: Vec<TierResponse> = tiers.into_iter().map(TierResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Tiers retrieved successfully",
    )))
}

/// Accrue a sales commission for a salesperson and period
///
/// The tier, rate and commission amount are derived from the sales total
/// against the configured tiers at creation time.
#[utoipa::path(
    post,
    path = "/api/v1/commissions",
    tag = "commissions",
    request_body = CreateCommissionRequest,
    responses(
        (status = 201, description = "Commission accrued successfully", body = ApiResponse<CommissionResponse>),
        (status = 409, description = "Commission for this salesperson and period exists", body = ErrorResponse),
        (status = 422, description = "Invalid commission", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_commission(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateCommissionRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CommissionResponse>>), ApiError> {
    if request.total_sales < Decimal::ZERO {
        return Err(
            LedgerError::Validation("total_sales cannot be negative".to_string()).into(),
        );
    }
    if request.period_end < request.period_start {
        return Err(
            LedgerError::Validation("period_end precedes period_start".to_string()).into(),
        );
    }

    let txn = state.db.begin().await?;

    let commission = sales_commission::ActiveModel {
        salesperson_id: Set(request.salesperson_id),
        period_start: Set(request.period_start),
        period_end: Set(request.period_end),
        total_sales: Set(request.total_sales),
        tier_name: Set(None),
        rate: Set(Decimal::ZERO),
        commission_amount: Set(Decimal::ZERO),
        status: Set(CommissionStatus::Accrued),
        ledger_entry_id: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let commission = assign_tier(&txn, commission, request.commission_amount).await?;
    txn.commit().await?;

    info!(
        "Commission {} accrued for salesperson {}",
        commission.id, commission.salesperson_id
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            CommissionResponse::from(commission),
            "Commission accrued successfully",
        )),
    ))
}

/// Get all sales commissions
#[utoipa::path(
    get,
    path = "/api/v1/commissions",
    tag = "commissions",
    params(ListCommissionsQuery),
    responses(
        (status = 200, description = "Commissions retrieved successfully", body = ApiResponse<Vec<CommissionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_commissions(
    State(state): State<AppState>,
    Query(query): Query<ListCommissionsQuery>,
) -> Result<Json<ApiResponse<Vec<CommissionResponse>>>, ApiError> {
    let mut finder = sales_commission::Entity::find()
        .order_by_asc(sales_commission::Column::PeriodStart)
        .order_by_asc(sales_commission::Column::SalespersonId);
    if let Some(salesperson_id) = query.salesperson_id {
        finder = finder.filter(sales_commission::Column::SalespersonId.eq(salesperson_id));
    }
    if let Some(status) = &query.status {
        finder = finder.filter(sales_commission::Column::Status.eq(status.as_str()));
    }

    let commissions = finder.all(&state.db).await?;
    debug!("Retrieved {} commissions", commissions.len());

    let responses: Vec<CommissionResponse> = commissions
        .into_iter()
        .map(CommissionResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Commissions retrieved successfully",
    )))
}

/// Get a specific sales commission by ID
#[utoipa::path(
    get,
    path = "/api/v1/commissions/{commission_id}",
    tag = "commissions",
    params(("commission_id" = i32, Path, description = "Commission ID")),
    responses(
        (status = 200, description = "Commission retrieved successfully", body = ApiResponse<CommissionResponse>),
        (status = 404, description = "Commission not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_commission(
    Path(commission_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CommissionResponse>>, ApiError> {
    let commission = sales_commission::Entity::find_by_id(commission_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "sales commission",
            id: commission_id,
        })?;

    Ok(Json(ApiResponse::new(
        CommissionResponse::from(commission),
        "Commission retrieved successfully",
    )))
}

/// Revise a commission's sales total
///
/// Tier, rate and commission amount are re-derived in the same
/// transaction as the update.
#[utoipa::path(
    put,
    path = "/api/v1/commissions/{commission_id}/sales",
    tag = "commissions",
    params(("commission_id" = i32, Path, description = "Commission ID")),
    request_body = UpdateSalesRequest,
    responses(
        (status = 200, description = "Sales total updated successfully", body = ApiResponse<CommissionResponse>),
        (status = 404, description = "Commission not found", body = ErrorResponse),
        (status = 422, description = "Invalid sales total", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_commission_sales(
    Path(commission_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateSalesRequest>>,
) -> Result<Json<ApiResponse<CommissionResponse>>, ApiError> {
    let updated = update_total_sales(&state.db, commission_id, request.total_sales).await?;
    info!(
        "Commission {} sales total revised to {}",
        updated.id, updated.total_sales
    );

    Ok(Json(ApiResponse::new(
        CommissionResponse::from(updated),
        "Sales total updated successfully",
    )))
}
