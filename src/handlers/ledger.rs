use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, NaiveDate, Utc};
use compute::journal::{post_journal as post_journal_op, JournalLine};
use model::entities::ledger_entry::{self, ReferenceType};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// One line of a journal posting request
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct JournalLineRequest {
    /// Account the line posts to
    pub account_id: i32,
    /// Debit amount; zero when the line is a credit
    #[schema(value_type = String)]
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount; zero when the line is a debit
    #[schema(value_type = String)]
    #[serde(default)]
    pub credit: Decimal,
}

/// Request body for posting a balanced journal
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct PostJournalRequest {
    /// Business description shared by all lines
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    /// Effective date of the transaction
    pub entry_date: NaiveDate,
    /// What kind of business event the journal records
    #[schema(value_type = Option<String>)]
    pub reference_type: Option<ReferenceType>,
    /// Identifier of the source document, if any
    pub reference_id: Option<i32>,
    /// The journal lines; debits must equal credits
    #[validate(length(min = 2))]
    pub lines: Vec<JournalLineRequest>,
}

/// A posted journal with its ledger entries
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JournalResponse {
    pub id: i32,
    pub description: String,
    pub posted_at: DateTime<Utc>,
    pub entries: Vec<LedgerEntryResponse>,
}

/// One immutable ledger entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: i32,
    pub account_id: i32,
    pub journal_id: i32,
    pub entry_date: NaiveDate,
    pub description: String,
    #[schema(value_type = String)]
    pub debit: Decimal,
    #[schema(value_type = String)]
    pub credit: Decimal,
    #[schema(value_type = String)]
    pub reference_type: ReferenceType,
    pub reference_id: Option<i32>,
    pub posted_at: DateTime<Utc>,
}

impl From<ledger_entry::Model> for LedgerEntryResponse {
    fn from(model: ledger_entry::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            journal_id: model.journal_id,
            entry_date: model.entry_date,
            description: model.description,
            debit: model.debit,
            credit: model.credit,
            reference_type: model.reference_type,
            reference_id: model.reference_id,
            posted_at: model.posted_at,
        }
    }
}

/// Query parameters for listing ledger entries
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListEntriesQuery {
    /// Only entries for this account
    pub account_id: Option<i32>,
    /// Only entries on or after this date
    pub start_date: Option<NaiveDate>,
    /// Only entries on or before this date
    pub end_date: Option<NaiveDate>,
    /// Only entries with this reference type
    pub reference_type: Option<String>,
}

/// Post a balanced journal to the general ledger
///
/// All lines land atomically or not at all. Unbalanced journals are
/// rejected, so the ledger stays balanced by construction.
#[utoipa::path(
    post,
    path = "/api/v1/ledger/journals",
    tag = "ledger",
    request_body = PostJournalRequest,
    responses(
        (status = 201, description = "Journal posted successfully", body = ApiResponse<JournalResponse>),
        (status = 404, description = "Referenced account not found", body = ErrorResponse),
        (status = 422, description = "Journal does not balance", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn post_journal(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<PostJournalRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<JournalResponse>>), ApiError> {
    debug!(
        "Posting journal '{}' with {} lines",
        request.description,
        request.lines.len()
    );

    let lines: Vec<JournalLine> = request
        .lines
        .iter()
        .map(|line| JournalLine {
            account_id: line.account_id,
            debit: line.debit,
            credit: line.credit,
        })
        .collect();

    let posted = post_journal_op(
        &state.db,
        request.entry_date,
        &request.description,
        request.reference_type.unwrap_or(ReferenceType::Manual),
        request.reference_id,
        &lines,
    )
    .await?;

    // Balances derived before this posting are stale now.
    state.cache.invalidate_all();
    info!("Journal {} posted", posted.journal.id);

    let response = JournalResponse {
        id: posted.journal.id,
        description: posted.journal.description,
        posted_at: posted.journal.posted_at,
        entries: posted
            .entries
            .into_iter()
            .map(LedgerEntryResponse::from)
            .collect(),
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(response, "Journal posted successfully")),
    ))
}

/// List ledger entries, optionally filtered by account, date window and reference type
#[utoipa::path(
    get,
    path = "/api/v1/ledger/entries",
    tag = "ledger",
    params(ListEntriesQuery),
    responses(
        (status = 200, description = "Entries retrieved successfully", body = ApiResponse<Vec<LedgerEntryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_ledger_entries(
    State(state): State<AppState>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<ApiResponse<Vec<LedgerEntryResponse>>>, ApiError> {
    let mut finder = ledger_entry::Entity::find()
        .order_by_asc(ledger_entry::Column::EntryDate)
        .order_by_asc(ledger_entry::Column::Id);

    if let Some(account_id) = query.account_id {
        finder = finder.filter(ledger_entry::Column::AccountId.eq(account_id));
    }
    if let Some(start) = query.start_date {
        finder = finder.filter(ledger_entry::Column::EntryDate.gte(start));
    }
    if let Some(end) = query.end_date {
        finder = finder.filter(ledger_entry::Column::EntryDate.lte(end));
    }
    if let Some(reference_type) = &query.reference_type {
        finder = finder.filter(ledger_entry::Column::ReferenceType.eq(reference_type.as_str()));
    }

    let entries = finder.all(&state.db).await?;
    debug!("Retrieved {} ledger entries", entries.len());

    let responses: Vec<LedgerEntryResponse> =
        entries.into_iter().map(LedgerEntryResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Entries retrieved successfully",
    )))
}
