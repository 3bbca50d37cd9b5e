use crate::schemas::{ApiError, ApiResponse, AppState, CachedData, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::DateRange;
use compute::balance::account_balance;
use compute::LedgerError;
use chrono::NaiveDate;
use model::entities::{account, ledger_entry};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a new account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateAccountRequest {
    /// Unique account code, e.g. "4000"
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    /// Account name
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Account classification: Asset, Liability, Equity, Revenue or Expense
    #[schema(value_type = String)]
    pub account_type: account::AccountType,
    /// Account description
    pub description: Option<String>,
    /// Whether the account is active (default: true)
    pub is_active: Option<bool>,
}

/// Request body for updating an account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateAccountRequest {
    /// Account name
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// Account description
    pub description: Option<String>,
    /// Whether the account is active
    pub is_active: Option<bool>,
    /// Account classification; immutable once the account has postings
    #[schema(value_type = Option<String>)]
    pub account_type: Option<account::AccountType>,
}

/// Account response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    #[schema(value_type = String)]
    pub account_type: account::AccountType,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<account::Model> for AccountResponse {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            account_type: model.account_type,
            description: model.description,
            is_active: model.is_active,
        }
    }
}

/// Derived balance of one account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub account_id: i32,
    pub code: String,
    /// `SUM(credit) - SUM(debit)` over the (optionally filtered) entries
    #[schema(value_type = String)]
    pub balance: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for listing accounts
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAccountsQuery {
    /// When true, only active accounts are returned
    pub active_only: Option<bool>,
}

/// Query parameters for the balance endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Start of the period filter (YYYY-MM-DD); requires end_date
    pub start_date: Option<NaiveDate>,
    /// End of the period filter (YYYY-MM-DD); requires start_date
    pub end_date: Option<NaiveDate>,
}

/// Create a new account in the chart of accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<AccountResponse>),
        (status = 409, description = "Account code already exists", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_account(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateAccountRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), ApiError> {
    debug!(
        "Creating account code: {}, name: {}, type: {:?}",
        request.code, request.name, request.account_type
    );

    let new_account = account::ActiveModel {
        code: Set(request.code.clone()),
        name: Set(request.name.clone()),
        account_type: Set(request.account_type),
        description: Set(request.description.clone()),
        is_active: Set(request.is_active.unwrap_or(true)),
        ..Default::default()
    };

    let account_model = new_account.insert(&state.db).await?;
    info!(
        "Account created with ID: {}, code: {}",
        account_model.id, account_model.code
    );

    let response = ApiResponse::new(
        AccountResponse::from(account_model),
        "Account created successfully",
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    tag = "accounts",
    params(ListAccountsQuery),
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = ApiResponse<Vec<AccountResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<ApiResponse<Vec<AccountResponse>>>, ApiError> {
    let mut finder = account::Entity::find().order_by_asc(account::Column::Code);
    if query.active_only.unwrap_or(false) {
        finder = finder.filter(account::Column::IsActive.eq(true));
    }

    let accounts = finder.all(&state.db).await?;
    debug!("Retrieved {} accounts", accounts.len());

    let responses: Vec<AccountResponse> = accounts.into_iter().map(AccountResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Accounts retrieved successfully",
    )))
}

/// Get a specific account by ID
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(("account_id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account retrieved successfully", body = ApiResponse<AccountResponse>),
        (status = 404, description = "Account not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account_model = account::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "account",
            id: account_id,
        })?;

    Ok(Json(ApiResponse::new(
        AccountResponse::from(account_model),
        "Account retrieved successfully",
    )))
}

/// Update an account
///
/// The account type is immutable once postings exist against the account.
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(("account_id" = i32, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated successfully", body = ApiResponse<AccountResponse>),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Account type change rejected", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateAccountRequest>>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account_model = account::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "account",
            id: account_id,
        })?;

    if let Some(new_type) = request.account_type {
        if new_type != account_model.account_type {
            let posting_count = ledger_entry::Entity::find()
                .filter(ledger_entry::Column::AccountId.eq(account_id))
                .count(&state.db)
                .await?;
            if posting_count > 0 {
                return Err(LedgerError::Validation(format!(
                    "account {} has {} postings; its type is immutable",
                    account_model.code, posting_count
                ))
                .into());
            }
        }
    }

    let mut active = account_model.into_active_model();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(account_type) = request.account_type {
        active.account_type = Set(account_type);
    }

    let updated = active.update(&state.db).await?;
    info!("Account {} updated", updated.id);

    Ok(Json(ApiResponse::new(
        AccountResponse::from(updated),
        "Account updated successfully",
    )))
}

/// Delete an account and, by cascade, all of its postings
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(("account_id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Account not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let account_model = account::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "account",
            id: account_id,
        })?;

    account::Entity::delete_by_id(account_model.id)
        .exec(&state.db)
        .await?;
    info!("Account {} deleted", account_id);

    // Cached balances may reference the deleted postings.
    state.cache.invalidate_all();

    Ok(Json(ApiResponse::new(
        format!("Account {} deleted", account_id),
        "Account deleted successfully",
    )))
}

/// Get the derived balance of an account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/balance",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Balance derived successfully", body = ApiResponse<BalanceResponse>),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Invalid period filter", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_account_balance(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<ApiResponse<BalanceResponse>>, ApiError> {
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)),
        (None, None) => None,
        _ => {
            return Err(LedgerError::Validation(
                "start_date and end_date must be supplied together".to_string(),
            )
            .into())
        }
    };

    let cache_key = format!(
        "balance:{}:{:?}:{:?}",
        account_id, query.start_date, query.end_date
    );
    let balance = match state.cache.get(&cache_key).await {
        Some(CachedData::Balance(cached)) => {
            trace!("Balance cache hit for {}", cache_key);
            cached
        }
        _ => {
            let computed = account_balance(&state.db, account_id, range).await?;
            state
                .cache
                .insert(cache_key, CachedData::Balance(computed))
                .await;
            computed
        }
    };

    let account_model = account::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "account",
            id: account_id,
        })?;

    let response = BalanceResponse {
        account_id,
        code: account_model.code,
        balance,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    Ok(Json(ApiResponse::new(
        response,
        "Balance derived successfully",
    )))
}

/// Get the ledger entries of one account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/entries",
    tag = "accounts",
    params(("account_id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Entries retrieved successfully", body = ApiResponse<Vec<crate::handlers::ledger::LedgerEntryResponse>>),
        (status = 404, description = "Account not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_account_entries(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<crate::handlers::ledger::LedgerEntryResponse>>>, ApiError> {
    account::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "account",
            id: account_id,
        })?;

    let entries = ledger_entry::Entity::find()
        .filter(ledger_entry::Column::AccountId.eq(account_id))
        .order_by_asc(ledger_entry::Column::EntryDate)
        .order_by_asc(ledger_entry::Column::Id)
        .all(&state.db)
        .await?;

    let responses: Vec<crate::handlers::ledger::LedgerEntryResponse> = entries
        .into_iter()
        .map(crate::handlers::ledger::LedgerEntryResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Entries retrieved successfully",
    )))
}
