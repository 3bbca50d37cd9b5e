use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use common::{AutomationRunSummary, CampaignRoi, ReportFigures, TaskOutcome, TrialBalanceLine};
use compute::LedgerError;
use moka::future::Cache;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for derived figures, invalidated on every ledger write
    pub cache: Cache<String, CachedData>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Balance(Decimal),
    Roi(CampaignRoi),
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Maps compute-layer failures onto HTTP responses carrying the
/// [`ErrorResponse`] envelope. Unique-constraint violations surface as
/// duplicate-key conflicts; everything else follows the error taxonomy.
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(LedgerError::Database(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LedgerError::Database(db_err) => match db_err.sql_err() {
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                    (StatusCode::CONFLICT, "DUPLICATE_KEY")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "CONNECTION_FAILURE"),
            },
            LedgerError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LedgerError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILURE"),
            LedgerError::NotBalanced { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "NOT_BALANCED"),
            LedgerError::OverPayment { .. } => (StatusCode::CONFLICT, "OVERPAYMENT"),
            LedgerError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_FAILURE")
            }
        };

        error!(code, error = %self.0, "Request failed");

        let body = ErrorResponse {
            error: self.0.to_string(),
            code: code.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

/// The authenticated back-office user on whose behalf a request runs.
///
/// Authentication itself is handled upstream; this service only carries
/// the resolved identity from the `X-Actor` header into audit fields
/// like `generated_by` and `triggered_by`. Requests without the header
/// act as "system".
#[derive(Debug, Clone)]
pub struct Actor(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get("x-actor")
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or("system")
            .to_string();
        Ok(Actor(actor))
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::accounts::create_account,
        crate::handlers::accounts::get_accounts,
        crate::handlers::accounts::get_account,
        crate::handlers::accounts::update_account,
        crate::handlers::accounts::delete_account,
        crate::handlers::accounts::get_account_balance,
        crate::handlers::accounts::get_account_entries,
        crate::handlers::ledger::post_journal,
        crate::handlers::ledger::get_ledger_entries,
        crate::handlers::payables::create_payable,
        crate::handlers::payables::get_payables,
        crate::handlers::payables::get_payable,
        crate::handlers::payables::apply_payment,
        crate::handlers::payables::cancel_payable,
        crate::handlers::receivables::create_receivable,
        crate::handlers::receivables::get_receivables,
        crate::handlers::receivables::get_receivable,
        crate::handlers::receivables::apply_receipt,
        crate::handlers::commissions::create_tier,
        crate::handlers::commissions::get_tiers,
        crate::handlers::commissions::create_commission,
        crate::handlers::commissions::get_commissions,
        crate::handlers::commissions::get_commission,
        crate::handlers::commissions::update_commission_sales,
        crate::handlers::campaigns::create_campaign,
        crate::handlers::campaigns::get_campaigns,
        crate::handlers::campaigns::get_campaign_roi,
        crate::handlers::campaigns::create_expense,
        crate::handlers::reports::generate_report,
        crate::handlers::reports::get_reports,
        crate::handlers::reports::get_report,
        crate::handlers::automation::run_automation,
        crate::handlers::automation::get_automation_runs,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ApiResponse<CampaignRoi>,
            ApiResponse<AutomationRunSummary>,
            ReportFigures,
            TrialBalanceLine,
            CampaignRoi,
            TaskOutcome,
            AutomationRunSummary,
            crate::handlers::accounts::CreateAccountRequest,
            crate::handlers::accounts::UpdateAccountRequest,
            crate::handlers::accounts::AccountResponse,
            crate::handlers::accounts::BalanceResponse,
            crate::handlers::ledger::PostJournalRequest,
            crate::handlers::ledger::JournalLineRequest,
            crate::handlers::ledger::JournalResponse,
            crate::handlers::ledger::LedgerEntryResponse,
            crate::handlers::payables::CreatePayableRequest,
            crate::handlers::payables::ApplyPaymentRequest,
            crate::handlers::payables::PayableResponse,
            crate::handlers::receivables::CreateReceivableRequest,
            crate::handlers::receivables::ApplyReceiptRequest,
            crate::handlers::receivables::ReceivableResponse,
            crate::handlers::commissions::CreateTierRequest,
            crate::handlers::commissions::TierResponse,
            crate::handlers::commissions::CreateCommissionRequest,
            crate::handlers::commissions::UpdateSalesRequest,
            crate::handlers::commissions::CommissionResponse,
            crate::handlers::campaigns::CreateCampaignRequest,
            crate::handlers::campaigns::CampaignResponse,
            crate::handlers::campaigns::CreateExpenseRequest,
            crate::handlers::campaigns::ExpenseResponse,
            crate::handlers::reports::GenerateReportRequest,
            crate::handlers::reports::ReportResponse,
            crate::handlers::automation::AutomationRunResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "accounts", description = "Chart of accounts and derived balances"),
        (name = "ledger", description = "General ledger journal posting"),
        (name = "payables", description = "Accounts payable sub-ledger"),
        (name = "receivables", description = "Accounts receivable sub-ledger"),
        (name = "commissions", description = "Commission tiers and sales commissions"),
        (name = "campaigns", description = "Marketing campaigns and expenses"),
        (name = "reports", description = "Financial report snapshots"),
        (name = "automation", description = "Automation runs"),
    ),
    info(
        title = "Back Office Accounting API",
        description = "Marketplace back-office accounting: chart of accounts, general ledger, sub-ledgers and financial reports",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
