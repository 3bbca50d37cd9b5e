use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{NaiveDate, Utc};
use compute::settlement::{apply_receivable_receipt, is_receivable_overdue, SettlementAccounts};
use compute::LedgerError;
use model::entities::receivable::{self, ReceivableStatus};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for recording a customer invoice
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateReceivableRequest {
    /// Customer name
    #[validate(length(min = 1, max = 255))]
    pub customer_name: String,
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

/// Request body for applying a received payment to a customer invoice
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ApplyReceiptRequest {
    /// Amount received; must not exceed the outstanding balance
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Date of the cash movement
    pub receipt_date: NaiveDate,
    /// Cash account code; supplied together with control_code to also
    /// post the movement to the ledger
    pub cash_code: Option<String>,
    /// Receivable control account code
    pub control_code: Option<String>,
}

/// Customer invoice response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReceivableResponse {
    pub id: i32,
    pub customer_name: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub received_amount: Decimal,
    /// Outstanding balance, `amount - received_amount`
    #[schema(value_type = String)]
    pub outstanding: Decimal,
    #[schema(value_type = String)]
    pub status: ReceivableStatus,
    /// Read-time flag: unsettled and past the due date
    pub overdue: bool,
}

impl From<receivable::Model> for ReceivableResponse {
    fn from(model: receivable::Model) -> Self {
        let outstanding = model.amount - model.received_amount;
        let overdue = is_receivable_overdue(model.due_date, &model.status, Utc::now().date_naive());
        Self {
            id: model.id,
            customer_name: model.customer_name,
            invoice_number: model.invoice_number,
            invoice_date: model.invoice_date,
            due_date: model.due_date,
            amount: model.amount,
            received_amount: model.received_amount,
            outstanding,
            status: model.status,
            overdue,
        }
    }
}

/// Query parameters for listing receivables
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListReceivablesQuery {
    /// Only invoices with this status
    pub status: Option<String>,
}

/// Record a customer invoice
#[utoipa::path(
    post,
    path = "/api/v1/receivables",
    tag = "receivables",
    request_body = CreateReceivableRequest,
    responses(
        (status = 201, description = "Receivable created successfully", body = ApiResponse<ReceivableResponse>),
        (status = 409, description = "Invoice number already exists", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_receivable(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateReceivableRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ReceivableResponse>>), ApiError> {
    if request.amount <= Decimal::ZERO {
        return Err(LedgerError::Validation("amount must be positive".to_string()).into());
    }
    if request.due_date < request.invoice_date {
        return Err(
            LedgerError::Validation("due_date precedes invoice_date".to_string()).into(),
        );
    }

    let invoice = receivable::ActiveModel {
        customer_name: Set(request.customer_name),
        invoice_number: Set(request.invoice_number),
        invoice_date: Set(request.invoice_date),
        due_date: Set(request.due_date),
        amount: Set(request.amount),
        received_amount: Set(Decimal::ZERO),
        status: Set(ReceivableStatus::Pending),
        ledger_entry_id: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(
        "Receivable {} created for customer {}",
        invoice.invoice_number, invoice.customer_name
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ReceivableResponse::from(invoice),
            "Receivable created successfully",
        )),
    ))
}

/// Get all customer invoices
#[utoipa::path(
    get,
    path = "/api/v1/receivables",
    tag = "receivables",
    params(ListReceivablesQuery),
    responses(
        (status = 200, description = "Receivables retrieved successfully", body = ApiResponse<Vec<ReceivableResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_receivables(
    State(state): State<AppState>,
    Query(query): Query<ListReceivablesQuery>,
) -> Result<Json<ApiResponse<Vec<ReceivableResponse>>>, ApiError> {
    let mut finder = receivable::Entity::find().order_by_asc(receivable::Column::DueDate);
    if let Some(status) = &query.status {
        finder = finder.filter(receivable::Column::Status.eq(status.as_str()));
    }

    let invoices = finder.all(&state.db).await?;
    debug!("Retrieved {} receivables", invoices.len());

    let responses: Vec<ReceivableResponse> = invoices
        .into_iter()
        .map(ReceivableResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Receivables retrieved successfully",
    )))
}

/// Get a specific customer invoice by ID
#[utoipa::path(
    get,
    path = "/api/v1/receivables/{receivable_id}",
    tag = "receivables",
    params(("receivable_id" = i32, Path, description = "Receivable ID")),
    responses(
        (status = 200, description = "Receivable retrieved successfully", body = ApiResponse<ReceivableResponse>),
        (status = 404, description = "Receivable not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_receivable(
    Path(receivable_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReceivableResponse>>, ApiError> {
    let invoice = receivable::Entity::find_by_id(receivable_id)
        .one(&state.db)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "receivable",
            id: receivable_id,
        })?;

    Ok(Json(ApiResponse::new(
        ReceivableResponse::from(invoice),
        "Receivable retrieved successfully",
    )))
}

/// Apply a received payment to a customer invoice
#[utoipa::path(
    post,
    path = "/api/v1/receivables/{receivable_id}/receipts",
    tag = "receivables",
    params(("receivable_id" = i32, Path, description = "Receivable ID")),
    request_body = ApplyReceiptRequest,
    responses(
        (status = 200, description = "Receipt applied successfully", body = ApiResponse<ReceivableResponse>),
        (status = 404, description = "Receivable not found", body = ErrorResponse),
        (status = 409, description = "Receipt exceeds the outstanding balance", body = ErrorResponse),
        (status = 422, description = "Invalid receipt", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn apply_receipt(
    Path(receivable_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<ApplyReceiptRequest>>,
) -> Result<Json<ApiResponse<ReceivableResponse>>, ApiError> {
    let accounts = match (request.cash_code, request.control_code) {
        (Some(cash_code), Some(control_code)) => Some(SettlementAccounts {
            cash_code,
            control_code,
        }),
        (None, None) => None,
        _ => {
            return Err(LedgerError::Validation(
                "cash_code and control_code must be supplied together".to_string(),
            )
            .into())
        }
    };
    let posts_to_ledger = accounts.is_some();

    let updated = apply_receivable_receipt(
        &state.db,
        receivable_id,
        request.amount,
        request.receipt_date,
        accounts,
    )
    .await?;

    if posts_to_ledger {
        state.cache.invalidate_all();
    }
    info!(
        "Receipt of {} applied to receivable {}",
        request.amount, updated.invoice_number
    );

    Ok(Json(ApiResponse::new(
        ReceivableResponse::from(updated),
        "Receipt applied successfully",
    )))
}
