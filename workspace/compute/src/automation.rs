use chrono::{Datelike, NaiveDate, Utc};
use common::{AutomationRunSummary, DateRange, TaskOutcome};
use model::entities::financial_report::ReportType;
use model::entities::ledger_entry::ReferenceType;
use model::entities::{
    account, automation_run, commission_tier, financial_report, ledger_entry,
    marketing_campaign, payable, receivable, sales_commission,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::commission::select_tier;
use crate::error::{LedgerError, Result};
use crate::journal::{account_by_code, post_journal_with_conn, JournalLine};
use crate::marketing::campaign_roi;
use crate::report::compute_figures;

/// Equity account receiving the net income of a closed period.
pub const RETAINED_EARNINGS_CODE: &str = "3900";

/// Runs the automation task list once. Every task is isolated: a failure
/// is recorded in the outcome list and the run continues with the next
/// task. All tasks are safe to re-run on the same day or period.
#[instrument(skip(db))]
pub async fn run_automation(
    db: &DatabaseConnection,
    triggered_by: &str,
    today: NaiveDate,
) -> Result<AutomationRunSummary> {
    let run = automation_run::ActiveModel {
        started_at: Set(Utc::now()),
        finished_at: Set(None),
        task_results: Set("[]".to_string()),
        triggered_by: Set(triggered_by.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut outcomes = Vec::new();
    outcomes.push(outcome("tier_progression", progress_commission_tiers(db).await));
    outcomes.push(outcome("overdue_scan", scan_overdue(db, today).await));
    outcomes.push(outcome("campaign_roi", refresh_campaign_roi(db).await));
    outcomes.push(outcome("period_closing", close_previous_period(db, today).await));

    for failed in outcomes.iter().filter(|o| !o.success) {
        warn!(task = %failed.task, detail = %failed.detail, "Automation task failed");
    }

    let mut active = run.into_active_model();
    active.finished_at = Set(Some(Utc::now()));
    active.task_results = Set(serde_json::to_string(&outcomes)?);
    let run = active.update(db).await?;

    info!(
        run_id = run.id,
        failed = outcomes.iter().filter(|o| !o.success).count(),
        "Automation run finished"
    );

    Ok(AutomationRunSummary {
        run_id: run.id,
        started_at: run.started_at,
        finished_at: run.finished_at,
        triggered_by: run.triggered_by,
        outcomes,
    })
}

fn outcome(task: &str, result: Result<String>) -> TaskOutcome {
    match result {
        Ok(detail) => TaskOutcome::ok(task, detail),
        Err(err) => TaskOutcome::failed(task, err.to_string()),
    }
}

/// Re-evaluates tier assignment for every commission not yet paid out.
/// Idempotent: recomputing a pure function converges after one pass.
async fn progress_commission_tiers(db: &DatabaseConnection) -> Result<String> {
    let tiers = commission_tier::Entity::find().all(db).await?;
    let commissions = sales_commission::Entity::find()
        .filter(
            sales_commission::Column::Status.ne(sales_commission::CommissionStatus::Paid),
        )
        .all(db)
        .await?;

    let mut changed = 0usize;
    let total = commissions.len();
    for commission in commissions {
        let selected = select_tier(&tiers, commission.total_sales);
        let (tier_name, rate) = match selected {
            Some(tier) => (Some(tier.name.clone()), tier.rate),
            None => (None, Decimal::ZERO),
        };
        if commission.tier_name == tier_name && commission.rate == rate {
            continue;
        }

        let amount = commission.total_sales * rate;
        let mut active = commission.into_active_model();
        active.tier_name = Set(tier_name);
        active.rate = Set(rate);
        active.commission_amount = Set(amount);
        active.update(db).await?;
        changed += 1;
    }

    Ok(format!("{changed} of {total} commissions re-tiered"))
}

/// Persists the Overdue status on past-due unsettled invoices. The status
/// write is absorbing until a settlement touches the row again, so
/// repeating the scan is a no-op.
async fn scan_overdue(db: &DatabaseConnection, today: NaiveDate) -> Result<String> {
    let payables = payable::Entity::update_many()
        .col_expr(
            payable::Column::Status,
            Expr::value(payable::PayableStatus::Overdue),
        )
        .filter(payable::Column::DueDate.lt(today))
        .filter(payable::Column::Status.is_in([
            payable::PayableStatus::Pending,
            payable::PayableStatus::Partial,
        ]))
        .exec(db)
        .await?;

    let receivables = receivable::Entity::update_many()
        .col_expr(
            receivable::Column::Status,
            Expr::value(receivable::ReceivableStatus::Overdue),
        )
        .filter(receivable::Column::DueDate.lt(today))
        .filter(receivable::Column::Status.is_in([
            receivable::ReceivableStatus::Pending,
            receivable::ReceivableStatus::Partial,
        ]))
        .exec(db)
        .await?;

    Ok(format!(
        "{} payables and {} receivables marked overdue",
        payables.rows_affected, receivables.rows_affected
    ))
}

/// Recomputes the derived ROI for every active campaign. Purely a read
/// pass over derived figures; nothing is written.
async fn refresh_campaign_roi(db: &DatabaseConnection) -> Result<String> {
    let campaigns = marketing_campaign::Entity::find()
        .filter(marketing_campaign::Column::IsActive.eq(true))
        .all(db)
        .await?;

    let mut over_budget = 0usize;
    let total = campaigns.len();
    for campaign in &campaigns {
        let roi = campaign_roi(db, campaign.id).await?;
        if roi.spent > roi.budget {
            warn!(campaign = %roi.name, spent = %roi.spent, budget = %roi.budget, "Campaign over budget");
            over_budget += 1;
        }
    }

    Ok(format!(
        "{total} campaigns refreshed, {over_budget} over budget"
    ))
}

fn previous_month(today: NaiveDate) -> Result<DateRange> {
    let first_of_this_month = today
        .with_day(1)
        .ok_or_else(|| LedgerError::Validation("invalid date".to_string()))?;
    let end = first_of_this_month
        .pred_opt()
        .ok_or_else(|| LedgerError::Validation("date out of range".to_string()))?;
    let start = end
        .with_day(1)
        .ok_or_else(|| LedgerError::Validation("invalid date".to_string()))?;
    Ok(DateRange::new(start, end))
}

/// Closes the previous calendar month: snapshots its income statement and
/// posts a closing journal moving the period's net income into retained
/// earnings. A closing entry dated at the period end marks the period as
/// closed, so re-running the task skips it.
async fn close_previous_period(db: &DatabaseConnection, today: NaiveDate) -> Result<String> {
    let period = previous_month(today)?;

    let already_closed = ledger_entry::Entity::find()
        .filter(ledger_entry::Column::ReferenceType.eq(ReferenceType::Closing))
        .filter(ledger_entry::Column::EntryDate.eq(period.end))
        .one(db)
        .await?
        .is_some();
    if already_closed {
        return Ok(format!("period ending {} already closed", period.end));
    }

    let txn = db.begin().await?;

    let figures = compute_figures(&txn, ReportType::IncomeStatement, period).await?;
    if figures.revenue == Decimal::ZERO && figures.expenses == Decimal::ZERO {
        return Ok(format!("period ending {}: nothing to close", period.end));
    }

    financial_report::ActiveModel {
        report_type: Set(ReportType::IncomeStatement),
        period_start: Set(period.start),
        period_end: Set(period.end),
        figures: Set(serde_json::to_string(&figures)?),
        generated_by: Set("automation".to_string()),
        generated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let retained = account_by_code(&txn, RETAINED_EARNINGS_CODE).await?;

    // Zero out each revenue/expense account's period activity and move
    // the difference to retained earnings.
    let accounts = account::Entity::find()
        .filter(
            Condition::any()
                .add(account::Column::AccountType.eq(account::AccountType::Revenue))
                .add(account::Column::AccountType.eq(account::AccountType::Expense)),
        )
        .all(&txn)
        .await?;

    let mut lines = Vec::new();
    for acct in &accounts {
        let entries = ledger_entry::Entity::find()
            .filter(ledger_entry::Column::AccountId.eq(acct.id))
            .filter(
                Condition::all()
                    .add(ledger_entry::Column::EntryDate.gte(period.start))
                    .add(ledger_entry::Column::EntryDate.lte(period.end)),
            )
            .filter(ledger_entry::Column::ReferenceType.ne(ReferenceType::Closing))
            .all(&txn)
            .await?;
        let net_credit = entries
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc + e.credit - e.debit);
        if net_credit > Decimal::ZERO {
            lines.push(JournalLine::debit(acct.id, net_credit));
        } else if net_credit < Decimal::ZERO {
            lines.push(JournalLine::credit(acct.id, -net_credit));
        }
    }

    let net_income = figures.net_income;
    if net_income > Decimal::ZERO {
        lines.push(JournalLine::credit(retained.id, net_income));
    } else if net_income < Decimal::ZERO {
        lines.push(JournalLine::debit(retained.id, -net_income));
    }

    if lines.len() < 2 {
        txn.commit().await?;
        return Ok(format!("period ending {}: nothing to close", period.end));
    }

    post_journal_with_conn(
        &txn,
        period.end,
        &format!("Close period {}", period.end.format("%Y-%m")),
        ReferenceType::Closing,
        None,
        &lines,
    )
    .await?;

    txn.commit().await?;
    Ok(format!(
        "period ending {} closed, net income {}",
        period.end, net_income
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{post_journal, JournalLine};
    use crate::testing::{seed_chart, seed_tiers, setup_db};
    use common::ReportFigures;
    use model::entities::prelude::*;
    use model::entities::sales_commission::CommissionStatus;

    async fn seed_january_ledger(db: &DatabaseConnection, chart: &crate::testing::Chart) {
        post_journal(
            db,
            NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            "sale",
            ReferenceType::Order,
            None,
            &[
                JournalLine::debit(chart.cash.id, Decimal::new(465000, 2)),
                JournalLine::credit(chart.sales.id, Decimal::new(465000, 2)),
            ],
        )
        .await
        .unwrap();
        post_journal(
            db,
            NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
            "fulfilment cost",
            ReferenceType::Expense,
            None,
            &[
                JournalLine::debit(chart.cogs.id, Decimal::new(120000, 2)),
                JournalLine::credit(chart.cash.id, Decimal::new(120000, 2)),
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn run_records_per_task_outcomes() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;
        seed_tiers(&db).await;
        seed_january_ledger(&db, &chart).await;

        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let summary = run_automation(&db, "scheduler", today).await.unwrap();

        assert_eq!(summary.outcomes.len(), 4);
        assert!(summary.outcomes.iter().all(|o| o.success), "{:?}", summary.outcomes);
        assert!(summary.finished_at.is_some());

        let run = AutomationRun::find_by_id(summary.run_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        let stored: Vec<TaskOutcome> = serde_json::from_str(&run.task_results).unwrap();
        assert_eq!(stored, summary.outcomes);
    }

    #[tokio::test]
    async fn period_closing_moves_net_income_to_retained_earnings() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;
        seed_tiers(&db).await;
        seed_january_ledger(&db, &chart).await;

        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        run_automation(&db, "scheduler", today).await.unwrap();

        // 4650.00 - 1200.00 lands in retained earnings.
        let retained = crate::balance::account_balance(&db, chart.retained_earnings.id, None)
            .await
            .unwrap();
        assert_eq!(retained, Decimal::new(345000, 2));

        // Revenue and expense accounts are zeroed out overall.
        let sales = crate::balance::account_balance(&db, chart.sales.id, None)
            .await
            .unwrap();
        assert_eq!(sales, Decimal::ZERO);
        let cogs = crate::balance::account_balance(&db, chart.cogs.id, None)
            .await
            .unwrap();
        assert_eq!(cogs, Decimal::ZERO);

        // The month's income statement snapshot was written.
        let reports = FinancialReport::find().all(&db).await.unwrap();
        assert_eq!(reports.len(), 1);
        let figures: ReportFigures = serde_json::from_str(&reports[0].figures).unwrap();
        assert_eq!(figures.net_income, Decimal::new(345000, 2));
    }

    #[tokio::test]
    async fn rerunning_automation_does_not_close_twice() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;
        seed_tiers(&db).await;
        seed_january_ledger(&db, &chart).await;

        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        run_automation(&db, "scheduler", today).await.unwrap();
        let second = run_automation(&db, "scheduler", today).await.unwrap();

        let closing = second
            .outcomes
            .iter()
            .find(|o| o.task == "period_closing")
            .unwrap();
        assert!(closing.success);
        assert!(closing.detail.contains("already closed"));

        // Retained earnings keep the single close amount.
        let retained = crate::balance::account_balance(&db, chart.retained_earnings.id, None)
            .await
            .unwrap();
        assert_eq!(retained, Decimal::new(345000, 2));
    }

    #[tokio::test]
    async fn closed_month_income_statement_is_reproducible() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;
        seed_tiers(&db).await;
        seed_january_ledger(&db, &chart).await;

        let january = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        );
        let before = compute_figures(&db, ReportType::IncomeStatement, january)
            .await
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        run_automation(&db, "scheduler", today).await.unwrap();

        // Closing entries are excluded from the period window, so the
        // closed month reports the same figures as before the close.
        let after = compute_figures(&db, ReportType::IncomeStatement, january)
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn overdue_scan_marks_past_due_invoices() {
        let db = setup_db().await;
        seed_chart(&db).await;
        seed_tiers(&db).await;

        payable::ActiveModel {
            vendor_name: Set("Acme Logistics".to_string()),
            invoice_number: Set("INV-2025-090".to_string()),
            invoice_date: Set(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()),
            due_date: Set(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()),
            amount: Set(Decimal::new(50000, 2)),
            paid_amount: Set(Decimal::ZERO),
            status: Set(payable::PayableStatus::Pending),
            ledger_entry_id: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let summary = run_automation(&db, "scheduler", today).await.unwrap();

        let scan = summary
            .outcomes
            .iter()
            .find(|o| o.task == "overdue_scan")
            .unwrap();
        assert!(scan.detail.starts_with("1 payables"));

        let stored = Payable::find().one(&db).await.unwrap().unwrap();
        assert_eq!(stored.status, payable::PayableStatus::Overdue);
    }

    #[tokio::test]
    async fn tier_progression_updates_stale_assignments() {
        let db = setup_db().await;
        seed_chart(&db).await;
        seed_tiers(&db).await;

        // A record whose sales grew past the silver threshold but whose
        // tier was never refreshed.
        sales_commission::ActiveModel {
            salesperson_id: Set(3),
            period_start: Set(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            period_end: Set(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
            total_sales: Set(Decimal::new(18_000, 0)),
            tier_name: Set(Some("bronze".to_string())),
            rate: Set(Decimal::new(500, 4)),
            commission_amount: Set(Decimal::new(900, 0)),
            status: Set(CommissionStatus::Accrued),
            ledger_entry_id: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        run_automation(&db, "scheduler", today).await.unwrap();

        let stored = SalesCommission::find().one(&db).await.unwrap().unwrap();
        assert_eq!(stored.tier_name.as_deref(), Some("silver"));
        assert_eq!(stored.commission_amount, Decimal::new(13_500_000, 4));
    }

    #[test]
    fn previous_month_spans_the_full_calendar_month() {
        let period = previous_month(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()).unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }
}
