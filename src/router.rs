use crate::handlers::{
    accounts::{
        create_account, delete_account, get_account, get_account_balance, get_account_entries,
        get_accounts, update_account,
    },
    automation::{get_automation_runs, run_automation},
    campaigns::{create_campaign, create_expense, get_campaign_roi, get_campaigns},
    commissions::{
        create_commission, create_tier, get_commission, get_commissions, get_tiers,
        update_commission_sales,
    },
    health::health_check,
    ledger::{get_ledger_entries, post_journal},
    payables::{apply_payment, cancel_payable, create_payable, get_payable, get_payables},
    receivables::{apply_receipt, create_receivable, get_receivable, get_receivables},
    reports::{generate_report, get_report, get_reports},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Chart of accounts and derived balances
        .route("/api/v1/accounts", post(create_account))
        .route("/api/v1/accounts", get(get_accounts))
        .route("/api/v1/accounts/:account_id", get(get_account))
        .route("/api/v1/accounts/:account_id", put(update_account))
        .route("/api/v1/accounts/:account_id", delete(delete_account))
        .route("/api/v1/accounts/:account_id/balance", get(get_account_balance))
        .route("/api/v1/accounts/:account_id/entries", get(get_account_entries))
        // General ledger
        .route("/api/v1/ledger/journals", post(post_journal))
        .route("/api/v1/ledger/entries", get(get_ledger_entries))
        // Accounts payable
        .route("/api/v1/payables", post(create_payable))
        .route("/api/v1/payables", get(get_payables))
        .route("/api/v1/payables/:payable_id", get(get_payable))
        .route("/api/v1/payables/:payable_id/payments", post(apply_payment))
        .route("/api/v1/payables/:payable_id/cancel", post(cancel_payable))
        // Accounts receivable
        .route("/api/v1/receivables", post(create_receivable))
        .route("/api/v1/receivables", get(get_receivables))
        .route("/api/v1/receivables/:receivable_id", get(get_receivable))
        .route("/api/v1/receivables/:receivable_id/receipts", post(apply_receipt))
        // Commission tiers and sales commissions
        .route("/api/v1/commissions/tiers", post(create_tier))
        .route("/api/v1/commissions/tiers", get(get_tiers))
        .route("/api/v1/commissions", post(create_commission))
        .route("/api/v1/commissions", get(get_commissions))
        .route("/api/v1/commissions/:commission_id", get(get_commission))
        .route("/api/v1/commissions/:commission_id/sales", put(update_commission_sales))
        // Marketing campaigns
        .route("/api/v1/campaigns", post(create_campaign))
        .route("/api/v1/campaigns", get(get_campaigns))
        .route("/api/v1/campaigns/:campaign_id/roi", get(get_campaign_roi))
        .route("/api/v1/campaigns/:campaign_id/expenses", post(create_expense))
        // Financial report snapshots
        .route("/api/v1/reports", post(generate_report))
        .route("/api/v1/reports", get(get_reports))
        .route("/api/v1/reports/:report_id", get(get_report))
        // Automation runs
        .route("/api/v1/automation/runs", post(run_automation))
        .route("/api/v1/automation/runs", get(get_automation_runs))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
