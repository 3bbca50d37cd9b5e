use chrono::NaiveDate;
use model::entities::ledger_entry::ReferenceType;
use model::entities::{payable, receivable};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set,
    TransactionTrait,
};
use tracing::{debug, instrument};

use crate::error::{LedgerError, Result};
use crate::journal::{account_by_code, post_journal_with_conn, JournalLine};

/// Chart-of-accounts codes for the optional settlement posting: the cash
/// account and the payable/receivable control account.
#[derive(Debug, Clone)]
pub struct SettlementAccounts {
    pub cash_code: String,
    pub control_code: String,
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(
            "payment amount must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Applies a payment to a vendor invoice.
///
/// `paid_amount` accumulates; the invoice transitions to Partial and then
/// to Paid exactly when the totals match. A payment that would overshoot
/// the invoice amount is rejected with `OverPayment` rather than clamped,
/// so re-sending a settling payment cannot double-count. When settlement
/// accounts are supplied, the cash movement is posted to the ledger in
/// the same transaction (debit control, credit cash).
#[instrument(skip(db, accounts))]
pub async fn apply_payable_payment(
    db: &DatabaseConnection,
    payable_id: i32,
    amount: Decimal,
    payment_date: NaiveDate,
    accounts: Option<SettlementAccounts>,
) -> Result<payable::Model> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    let invoice = payable::Entity::find_by_id(payable_id)
        .one(&txn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "payable",
            id: payable_id,
        })?;

    if invoice.status == payable::PayableStatus::Cancelled {
        return Err(LedgerError::Validation(format!(
            "payable {} is cancelled",
            invoice.invoice_number
        )));
    }

    let outstanding = invoice.amount - invoice.paid_amount;
    if amount > outstanding {
        return Err(LedgerError::OverPayment {
            invoice: invoice.invoice_number,
            attempted: amount,
            outstanding,
        });
    }

    let new_paid = invoice.paid_amount + amount;
    let new_status = if new_paid == invoice.amount {
        payable::PayableStatus::Paid
    } else {
        payable::PayableStatus::Partial
    };

    if let Some(accounts) = &accounts {
        let cash = account_by_code(&txn, &accounts.cash_code).await?;
        let control = account_by_code(&txn, &accounts.control_code).await?;
        post_journal_with_conn(
            &txn,
            payment_date,
            &format!("Payment on {}", invoice.invoice_number),
            ReferenceType::Payment,
            Some(invoice.id),
            &[
                JournalLine::debit(control.id, amount),
                JournalLine::credit(cash.id, amount),
            ],
        )
        .await?;
    }

    let invoice_number = invoice.invoice_number.clone();
    let mut active = invoice.into_active_model();
    active.paid_amount = Set(new_paid);
    active.status = Set(new_status);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    debug!(
        invoice = %invoice_number,
        %new_paid,
        status = ?updated.status,
        "Applied payable payment"
    );
    Ok(updated)
}

/// Applies a received payment to a customer invoice. Mirror of
/// [`apply_payable_payment`]; the optional posting debits cash and
/// credits the receivable control account.
#[instrument(skip(db, accounts))]
pub async fn apply_receivable_receipt(
    db: &DatabaseConnection,
    receivable_id: i32,
    amount: Decimal,
    receipt_date: NaiveDate,
    accounts: Option<SettlementAccounts>,
) -> Result<receivable::Model> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    let invoice = receivable::Entity::find_by_id(receivable_id)
        .one(&txn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "receivable",
            id: receivable_id,
        })?;

    if invoice.status == receivable::ReceivableStatus::Cancelled {
        return Err(LedgerError::Validation(format!(
            "receivable {} is cancelled",
            invoice.invoice_number
        )));
    }

    let outstanding = invoice.amount - invoice.received_amount;
    if amount > outstanding {
        return Err(LedgerError::OverPayment {
            invoice: invoice.invoice_number,
            attempted: amount,
            outstanding,
        });
    }

    let new_received = invoice.received_amount + amount;
    let new_status = if new_received == invoice.amount {
        receivable::ReceivableStatus::Received
    } else {
        receivable::ReceivableStatus::Partial
    };

    if let Some(accounts) = &accounts {
        let cash = account_by_code(&txn, &accounts.cash_code).await?;
        let control = account_by_code(&txn, &accounts.control_code).await?;
        post_journal_with_conn(
            &txn,
            receipt_date,
            &format!("Receipt on {}", invoice.invoice_number),
            ReferenceType::Payment,
            Some(invoice.id),
            &[
                JournalLine::debit(cash.id, amount),
                JournalLine::credit(control.id, amount),
            ],
        )
        .await?;
    }

    let mut active = invoice.into_active_model();
    active.received_amount = Set(new_received);
    active.status = Set(new_status);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// True when an unsettled vendor invoice is past its due date. Used at
/// read time by the API responses; the automation overdue scan persists
/// the status.
pub fn is_payable_overdue(
    due_date: NaiveDate,
    status: &payable::PayableStatus,
    today: NaiveDate,
) -> bool {
    matches!(
        status,
        payable::PayableStatus::Pending | payable::PayableStatus::Partial
    ) && due_date < today
}

/// Mirror of [`is_payable_overdue`] for customer invoices.
pub fn is_receivable_overdue(
    due_date: NaiveDate,
    status: &receivable::ReceivableStatus,
    today: NaiveDate,
) -> bool {
    matches!(
        status,
        receivable::ReceivableStatus::Pending | receivable::ReceivableStatus::Partial
    ) && due_date < today
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_chart, setup_db};
    use model::entities::ledger_entry;
    use model::entities::prelude::*;
    use sea_orm::{ColumnTrait, QueryFilter};

    async fn create_payable(db: &DatabaseConnection, amount: Decimal) -> payable::Model {
        payable::ActiveModel {
            vendor_name: Set("Acme Logistics".to_string()),
            invoice_number: Set("INV-2026-001".to_string()),
            invoice_date: Set(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()),
            due_date: Set(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()),
            amount: Set(amount),
            paid_amount: Set(Decimal::ZERO),
            status: Set(payable::PayableStatus::Pending),
            ledger_entry_id: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn full_payment_transitions_pending_to_paid() {
        let db = setup_db().await;
        seed_chart(&db).await;
        let invoice = create_payable(&db, Decimal::new(85000, 2)).await;

        let updated = apply_payable_payment(
            &db,
            invoice.id,
            Decimal::new(85000, 2),
            NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(updated.status, payable::PayableStatus::Paid);
        assert_eq!(updated.paid_amount, Decimal::new(85000, 2));
    }

    #[tokio::test]
    async fn partial_payment_transitions_to_partial() {
        let db = setup_db().await;
        seed_chart(&db).await;
        let invoice = create_payable(&db, Decimal::new(85000, 2)).await;

        let updated = apply_payable_payment(
            &db,
            invoice.id,
            Decimal::new(30000, 2),
            NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(updated.status, payable::PayableStatus::Partial);
        assert_eq!(updated.paid_amount, Decimal::new(30000, 2));
    }

    #[tokio::test]
    async fn repeating_a_settling_payment_is_rejected_not_double_counted() {
        let db = setup_db().await;
        seed_chart(&db).await;
        let invoice = create_payable(&db, Decimal::new(85000, 2)).await;
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();

        apply_payable_payment(&db, invoice.id, Decimal::new(85000, 2), date, None)
            .await
            .unwrap();

        let repeat =
            apply_payable_payment(&db, invoice.id, Decimal::new(85000, 2), date, None).await;
        assert!(matches!(repeat, Err(LedgerError::OverPayment { .. })));

        let stored = Payable::find_by_id(invoice.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.paid_amount, Decimal::new(85000, 2));
        assert_eq!(stored.status, payable::PayableStatus::Paid);
    }

    #[tokio::test]
    async fn overpayment_is_flagged_with_the_outstanding_amount() {
        let db = setup_db().await;
        seed_chart(&db).await;
        let invoice = create_payable(&db, Decimal::new(85000, 2)).await;

        let result = apply_payable_payment(
            &db,
            invoice.id,
            Decimal::new(90000, 2),
            NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            None,
        )
        .await;

        match result {
            Err(LedgerError::OverPayment {
                attempted,
                outstanding,
                ..
            }) => {
                assert_eq!(attempted, Decimal::new(90000, 2));
                assert_eq!(outstanding, Decimal::new(85000, 2));
            }
            other => panic!("expected OverPayment, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_amount_is_a_validation_failure() {
        let db = setup_db().await;
        seed_chart(&db).await;
        let invoice = create_payable(&db, Decimal::new(85000, 2)).await;

        let result = apply_payable_payment(
            &db,
            invoice.id,
            Decimal::ZERO,
            NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            None,
        )
        .await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn settlement_posts_a_balanced_payment_journal() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;
        let invoice = create_payable(&db, Decimal::new(85000, 2)).await;

        apply_payable_payment(
            &db,
            invoice.id,
            Decimal::new(85000, 2),
            NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            Some(SettlementAccounts {
                cash_code: "1000".to_string(),
                control_code: "2000".to_string(),
            }),
        )
        .await
        .unwrap();

        let entries = LedgerEntry::find()
            .filter(ledger_entry::Column::ReferenceType.eq(ledger_entry::ReferenceType::Payment))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);

        let debit = entries.iter().find(|e| e.debit > Decimal::ZERO).unwrap();
        let credit = entries.iter().find(|e| e.credit > Decimal::ZERO).unwrap();
        assert_eq!(debit.account_id, chart.payable_control.id);
        assert_eq!(credit.account_id, chart.cash.id);
        assert_eq!(debit.debit, credit.credit);
        assert_eq!(debit.reference_id, Some(invoice.id));
    }

    #[tokio::test]
    async fn receivable_receipt_mirrors_the_payable_flow() {
        let db = setup_db().await;
        seed_chart(&db).await;

        let invoice = receivable::ActiveModel {
            customer_name: Set("Northwind Retail".to_string()),
            invoice_number: Set("AR-2026-003".to_string()),
            invoice_date: Set(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()),
            due_date: Set(NaiveDate::from_ymd_opt(2026, 2, 5).unwrap()),
            amount: Set(Decimal::new(120000, 2)),
            received_amount: Set(Decimal::ZERO),
            status: Set(receivable::ReceivableStatus::Pending),
            ledger_entry_id: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let updated = apply_receivable_receipt(
            &db,
            invoice.id,
            Decimal::new(120000, 2),
            NaiveDate::from_ymd_opt(2026, 1, 25).unwrap(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(updated.status, receivable::ReceivableStatus::Received);
        assert_eq!(updated.received_amount, Decimal::new(120000, 2));
    }

    #[test]
    fn overdue_is_a_read_time_date_comparison() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();

        assert!(is_payable_overdue(due, &payable::PayableStatus::Pending, today));
        assert!(is_payable_overdue(due, &payable::PayableStatus::Partial, today));
        assert!(!is_payable_overdue(due, &payable::PayableStatus::Paid, today));
        assert!(!is_payable_overdue(today, &payable::PayableStatus::Pending, today));

        assert!(is_receivable_overdue(
            due,
            &receivable::ReceivableStatus::Pending,
            today
        ));
        assert!(!is_receivable_overdue(
            due,
            &receivable::ReceivableStatus::Received,
            today
        ));
        assert!(!is_receivable_overdue(
            due,
            &receivable::ReceivableStatus::Cancelled,
            today
        ));
    }
}
