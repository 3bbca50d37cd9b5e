use crate::schemas::{ApiError, ApiResponse, AppState, CachedData, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use common::CampaignRoi;
use compute::journal::{account_by_code, post_journal_with_conn, JournalLine};
use compute::marketing::campaign_roi;
use compute::LedgerError;
use model::entities::ledger_entry::ReferenceType;
use model::entities::{marketing_campaign, marketing_expense};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a marketing campaign
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCampaignRequest {
    /// Campaign name
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// First day of the campaign
    pub starts_on: NaiveDate,
    /// Last day of the campaign, if already known
    pub ends_on: Option<NaiveDate>,
    /// Planned spend ceiling
    #[schema(value_type = String)]
    pub budget: Decimal,
}

/// Campaign response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignResponse {
    pub id: i32,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub budget: Decimal,
    #[schema(value_type = String)]
    pub attributed_revenue: Decimal,
    pub is_active: bool,
}

impl From<marketing_campaign::Model> for CampaignResponse {
    fn from(model: marketing_campaign::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            starts_on: model.starts_on,
            ends_on: model.ends_on,
            budget: model.budget,
            attributed_revenue: model.attributed_revenue,
            is_active: model.is_active,
        }
    }
}

/// Request body for recording a marketing expense
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateExpenseRequest {
    /// Date the expense was incurred
    pub expense_date: NaiveDate,
    /// What the money went to
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    /// Expense amount
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Marketing expense account code; supplied together with cash_code
    /// to also post the expense to the ledger
    pub expense_code: Option<String>,
    /// Cash account code
    pub cash_code: Option<String>,
}

/// Marketing expense response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: i32,
    pub campaign_id: Option<i32>,
    pub expense_date: NaiveDate,
    pub description: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
}

impl From<marketing_expense::Model> for ExpenseResponse {
    fn from(model: marketing_expense::Model) -> Self {
        Self {
            id: model.id,
            campaign_id: model.campaign_id,
            expense_date: model.expense_date,
            description: model.description,
            amount: model.amount,
        }
    }
}

/// Query parameters for listing campaigns
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCampaignsQuery {
    /// When true, only active campaigns are returned
    pub active_only: Option<bool>,
}

/// Create a marketing campaign
#[utoipa::path(
    post,
    path = "/api/v1/campaigns",
    tag = "campaigns",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created successfully", body = ApiResponse<CampaignResponse>),
        (status = 422, description = "Invalid campaign", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_campaign(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateCampaignRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CampaignResponse>>), ApiError> {
    if request.budget < Decimal::ZERO {
        return Err(LedgerError::Validation("budget cannot be negative".to_string()).into());
    }
    if let Some(ends_on) = request.ends_on {
        if ends_on < request.starts_on {
            return Err(
                LedgerError::Validation("ends_on precedes starts_on".to_string()).into(),
            );
        }
    }

    let campaign = marketing_campaign::ActiveModel {
        name: Set(request.name),
        starts_on: Set(request.starts_on),
        ends_on: Set(request.ends_on),
        budget: Set(request.budget),
        attributed_revenue: Set(Decimal::ZERO),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Campaign {} created", campaign.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            CampaignResponse::from(campaign),
            "Campaign created successfully",
        )),
    ))
}

/// Get all marketing campaigns
#[utoipa::path(
    get,
    path = "/api/v1/campaigns",
    tag = "campaigns",
    params(ListCampaignsQuery),
    responses(
        (status = 200, description = "Campaigns retrieved successfully", body = ApiResponse<Vec<CampaignResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_campaigns(
    State(state): State<AppState>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<Json<ApiResponse<Vec<CampaignResponse>>>, ApiError> {
    let mut finder =
        marketing_campaign::Entity::find().order_by_asc(marketing_campaign::Column::StartsOn);
    if query.active_only.unwrap_or(false) {
        finder = finder.filter(marketing_campaign::Column::IsActive.eq(true));
    }

    let campaigns = finder.all(&state.db).await?;
    debug!("Retrieved {} campaigns", campaigns.len());

    let responses: Vec<CampaignResponse> =
        campaigns.into_iter().map(CampaignResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Campaigns retrieved successfully",
    )))
}

/// Get the derived ROI of a campaign
///
/// Spent is summed from the expense records at read time; ROI is absent
/// until anything has been spent.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{campaign_id}/roi",
    tag = "campaigns",
    params(("campaign_id" = i32, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "ROI derived successfully", body = ApiResponse<CampaignRoi>),
        (status = 404, description = "Campaign not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_campaign_roi(
    Path(campaign_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CampaignRoi>>, ApiError> {
    let cache_key = format!("roi:{campaign_id}");
    let roi = match state.cache.get(&cache_key).await {
        Some(CachedData::Roi(cached)) => {
            trace!("ROI cache hit for campaign {}", campaign_id);
            cached
        }
        _ => {
            let derived = campaign_roi(&state.db, campaign_id).await?;
            state
                .cache
                .insert(cache_key, CachedData::Roi(derived.clone()))
                .await;
            derived
        }
    };

    Ok(Json(ApiResponse::new(roi, "ROI derived successfully")))
}

/// Record a marketing expense against a campaign
///
/// When account codes are supplied, a balanced expense journal is posted
/// in the same transaction (debit marketing expense, credit cash).
#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{campaign_id}/expenses",
    tag = "campaigns",
    params(("campaign_id" = i32, Path, description = "Campaign ID")),
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded successfully", body = ApiResponse<ExpenseResponse>),
        (status = 404, description = "Campaign not found", body = ErrorResponse),
        (status = 422, description = "Invalid expense", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_expense(
    Path(campaign_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateExpenseRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseResponse>>), ApiError> {
    if request.amount <= Decimal::ZERO {
        return Err(LedgerError::Validation("amount must be positive".to_string()).into());
    }

    let txn = state.db.begin().await?;

    marketing_campaign::Entity::find_by_id(campaign_id)
        .one(&txn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "marketing campaign",
            id: campaign_id,
        })?;

    let ledger_entry_id = match (&request.expense_code, &request.cash_code) {
        (Some(expense_code), Some(cash_code)) => {
            let expense_account = account_by_code(&txn, expense_code).await?;
            let cash_account = account_by_code(&txn, cash_code).await?;
            let posted = post_journal_with_conn(
                &txn,
                request.expense_date,
                &request.description,
                ReferenceType::Expense,
                Some(campaign_id),
                &[
                    JournalLine::debit(expense_account.id, request.amount),
                    JournalLine::credit(cash_account.id, request.amount),
                ],
            )
            .await?;
            posted.entries.first().map(|entry| entry.id)
        }
        (None, None) => None,
        _ => {
            return Err(LedgerError::Validation(
                "expense_code and cash_code must be supplied together".to_string(),
            )
            .into())
        }
    };
    let posted_to_ledger = ledger_entry_id.is_some();

    let expense = marketing_expense::ActiveModel {
        campaign_id: Set(Some(campaign_id)),
        expense_date: Set(request.expense_date),
        description: Set(request.description),
        amount: Set(request.amount),
        ledger_entry_id: Set(ledger_entry_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    // The campaign's cached ROI is stale, and so are balances when the
    // expense also hit the ledger.
    if posted_to_ledger {
        state.cache.invalidate_all();
    } else {
        state.cache.invalidate(&format!("roi:{campaign_id}")).await;
    }

    info!(
        "Expense of {} recorded against campaign {}",
        expense.amount, campaign_id
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ExpenseResponse::from(expense),
            "Expense recorded successfully",
        )),
    ))
}
