use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{NaiveDate, Utc};
use compute::settlement::{apply_payable_payment, is_payable_overdue, SettlementAccounts};
use compute::LedgerError;
use model::entities::payable::{self, PayableStatus};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for recording a vendor invoice
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreatePayableRequest {
    /// Vendor name
    #[validate(length(min = 1, max = 255))]
    pub vendor_name: String,
    /// Unique invoice number
    #[validate(length(min = 1, max = 100))]
    pub invoice_number: String,
    /// Invoice issue date
    pub invoice_date: NaiveDate,
    /// Payment due date
    pub due_date: NaiveDate,
    /// Invoice amount
    #[schema(value_type = String)]
    pub amount: Decimal,
}

/// Request body for applying a payment to a vendor invoice
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ApplyPaymentRequest {
    /// Amount being paid; must not exceed the outstanding balance
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Date of the cash movement
    pub payment_date: NaiveDate,
    /// Cash account code; supplied together with control_code to also
    /// post the movement to the ledger
    pub cash_code: Option<String>,
    /// Payable control account code
    pub control_code: Option<String>,
}

/// Vendor invoice response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PayableResponse {
    pub id: i32,
    pub vendor_name: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub paid_amount: Decimal,
    /// Outstanding balance, `amount - paid_amount`
    #[schema(value_type = String)]
    pub outstanding: Decimal,
    #[schema(value_type = String)]
    pub status: PayableStatus,
    /// Read-time flag: unsettled and past the due date
    pub overdue: bool,
}

impl From<payable::Model> for PayableResponse {
    fn from(model: payable::Model) -> Self {
        let outstanding = model.amount - model.paid_amount;
        let overdue = is_payable_overdue(model.due_date, &model.status, Utc::now().date_naive());
        Self {
            id: model.id,
            vendor_name: model.vendor_name,
            invoice_number: model.invoice_number,
            invoice_date: model.invoice_date,
            due_date: model.due_date,
            amount: model.amount,
            paid_amount: model.paid_amount,
            outstanding,
            status: model.status,
            overdue,
        }
    }
}

/// Query parameters for listing payables
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPayablesQuery {
    /// Only invoices with this status
    pub status: Option<String>,
}

fn settlement_accounts(
    cash_code: Option<String>,
    control_code: Option<String>,
) -> Result<Option<SettlementAccounts>, LedgerError> {
    match (cash_code, control_code) {
        (Some(cash_code), Some(control_code)) => Ok(Some(SettlementAccounts {
            cash_code,
            control_code,
        })),
        (None, None) => Ok(None),
        _ => Err(LedgerError::Validation(
            "cash_code and control_code must be supplied together".to_string(),
        )),
    }
}

/// Record a vendor invoice
#[utoipa::path(
    post,
    path = "/api/v1/payables",
    tag = "payables",
    request_body = CreatePayableRequest,
    responses(
        (status = 201, description = "Payable created successfully", body = ApiResponse<PayableResponse>),
        (status = 409, description = "Invoice number already exists", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_payable(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreatePayableRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PayableResponse>>), ApiError> {
    if request.amount <= Decimal::ZERO {
        return Err(LedgerError::Validation("amount must be positive".to_string()).into());
    }
    if request.due_date < request.invoice_date {
        return Err(
            LedgerError::Validation("due_date precedes invoice_date".to_string()).into(),
        );
    }

    let invoice = payable::ActiveModel {
        vendor_name: Set(request.vendor_name),
        invoice_number: Set(request.invoice_number),
        invoice_date: Set(request.invoice_date),
        due_date: Set(request.due_date),
        amount: Set(request.amount),
        paid_amount: Set(Decimal::ZERO),
        status: Set(PayableStatus::Pending),
        ledger_entry_id: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(
        "Payable {} created for vendor {}",
        invoice.invoice_number, invoice.vendor_name
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            PayableResponse::from(invoice),
            "Payable created successfully",
        )),
    ))
}

/// Get all vendor invoices
#[utoipa::path(
    get,
    path = "/api/v1/payables",
    tag = "payables",
    params(ListPayablesQuery),
    responses(
        (status = 200, description = "Payables retrieved successfully", body = ApiResponse<Vec<PayableResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_payables(
    State(state): State<AppState>,
    Query(query): Query<ListPayablesQuery>,
) -> Result<Json<ApiResponse<Vec<PayableResponse>>>, ApiError> {
    let mut finder = payable::Entity::find().order_by_asc(payable::Column::DueDate);
    if let Some(status) = &query.status {
        finder = finder.filter(payable::Column::Status.eq(status.as_str()));
    }

    let invoices = finder.all(&state.db).await?;
    debug!("Retrieved {} payables", invoices.len());

    let responses: Vec<PayableResponse> =
        invoices.into_iter().map(PayableResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Payables retrieved successfully",
    )))
}

/// Get a specific vendor invoice by ID
#[utoipa::path(
    get,
    path = "/api/v1/payables/{payable_id}",
    tag = "payables",
    params(("payable_id" = i32, Path, description = "Payable ID")),
    responses(
        (status = 200, description = "Payable retrieved successfully", body = ApiResponse<PayableResponse>),
        (status = 404, description = "Payable not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_payable(
    Path(payable_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PayableResponse>>, ApiError> {
    let invoice = payable::Entity::find_by_id(payable_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "payable",
            id: payable_id,
        })?;

    Ok(Json(ApiResponse::new(
        PayableResponse::from(invoice),
        "Payable retrieved successfully",
    )))
}

/// Apply a payment to a vendor invoice
///
/// Payments accumulate until the invoice is settled; an amount exceeding
/// the outstanding balance is rejected rather than clamped.
#[utoipa::path(
    post,
    path = "/api/v1/payables/{payable_id}/payments",
    tag = "payables",
    params(("payable_id" = i32, Path, description = "Payable ID")),
    request_body = ApplyPaymentRequest,
    responses(
        (status = 200, description = "Payment applied successfully", body = ApiResponse<PayableResponse>),
        (status = 404, description = "Payable not found", body = ErrorResponse),
        (status = 409, description = "Payment exceeds the outstanding balance", body = ErrorResponse),
        (status = 422, description = "Invalid payment", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn apply_payment(
    Path(payable_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<ApplyPaymentRequest>>,
) -> Result<Json<ApiResponse<PayableResponse>>, ApiError> {
    let accounts = settlement_accounts(request.cash_code, request.control_code)?;
    let posts_to_ledger = accounts.is_some();

    let updated = apply_payable_payment(
        &state.db,
        payable_id,
        request.amount,
        request.payment_date,
        accounts,
    )
    .await?;

    if posts_to_ledger {
        state.cache.invalidate_all();
    }
    info!(
        "Payment of {} applied to payable {}",
        request.amount, updated.invoice_number
    );

    Ok(Json(ApiResponse::new(
        PayableResponse::from(updated),
        "Payment applied successfully",
    )))
}

/// Cancel a vendor invoice
///
/// Cancellation is only possible before any payment has been applied.
#[utoipa::path(
    post,
    path = "/api/v1/payables/{payable_id}/cancel",
    tag = "payables",
    params(("payable_id" = i32, Path, description = "Payable ID")),
    responses(
        (status = 200, description = "Payable cancelled successfully", body = ApiResponse<PayableResponse>),
        (status = 404, description = "Payable not found", body = ErrorResponse),
        (status = 422, description = "Payable already has payments", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn cancel_payable(
    Path(payable_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PayableResponse>>, ApiError> {
    let invoice = payable::Entity::find_by_id(payable_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "payable",
            id: payable_id,
        })?;

    if invoice.paid_amount > Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "payable {} has payments applied and cannot be cancelled",
            invoice.invoice_number
        ))
        .into());
    }

    let mut active = invoice.into_active_model();
    active.status = Set(PayableStatus::Cancelled);
    let updated = active.update(&state.db).await?;
    info!("Payable {} cancelled", updated.invoice_number);

    Ok(Json(ApiResponse::new(
        PayableResponse::from(updated),
        "Payable cancelled successfully",
    )))
}
