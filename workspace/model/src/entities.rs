//! This file serves as the root for all SeaORM entity modules.
//! We define the persisted data model of the back-office accounting
//! subsystem here: the chart of accounts, the general ledger and the
//! sub-ledgers (payables, receivables, commissions, marketing expenses)
//! that hang off it.

pub mod account;
pub mod automation_run;
pub mod commission_tier;
pub mod financial_report;
pub mod journal;
pub mod ledger_entry;
pub mod marketing_campaign;
pub mod marketing_expense;
pub mod payable;
pub mod receivable;
pub mod sales_commission;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::automation_run::Entity as AutomationRun;
    pub use super::commission_tier::Entity as CommissionTier;
    pub use super::financial_report::Entity as FinancialReport;
    pub use super::journal::Entity as Journal;
    pub use super::ledger_entry::Entity as LedgerEntry;
    pub use super::marketing_campaign::Entity as MarketingCampaign;
    pub use super::marketing_expense::Entity as MarketingExpense;
    pub use super::payable::Entity as Payable;
    pub use super::receivable::Entity as Receivable;
    pub use super::sales_commission::Entity as SalesCommission;
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, Utc};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        // Chart of accounts
        let cash = account::ActiveModel {
            code: Set("1000".to_string()),
            name: Set("Cash".to_string()),
            account_type: Set(account::AccountType::Asset),
            description: Set(Some("Operating cash".to_string())),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let sales = account::ActiveModel {
            code: Set("4000".to_string()),
            name: Set("Product Sales".to_string()),
            account_type: Set(account::AccountType::Revenue),
            description: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // One balanced journal: cash debit against sales credit
        let journal = journal::ActiveModel {
            description: Set("Order #41 settled".to_string()),
            posted_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let debit_entry = ledger_entry::ActiveModel {
            account_id: Set(cash.id),
            journal_id: Set(journal.id),
            entry_date: Set(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()),
            description: Set("Order #41 settled".to_string()),
            debit: Set(Decimal::new(125000, 2)), // 1250.00
            credit: Set(Decimal::ZERO),
            reference_type: Set(ledger_entry::ReferenceType::Order),
            reference_id: Set(Some(41)),
            posted_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        ledger_entry::ActiveModel {
            account_id: Set(sales.id),
            journal_id: Set(journal.id),
            entry_date: Set(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()),
            description: Set("Order #41 settled".to_string()),
            debit: Set(Decimal::ZERO),
            credit: Set(Decimal::new(125000, 2)),
            reference_type: Set(ledger_entry::ReferenceType::Order),
            reference_id: Set(Some(41)),
            posted_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Sub-ledgers
        let payable = payable::ActiveModel {
            vendor_name: Set("Acme Logistics".to_string()),
            invoice_number: Set("INV-2026-007".to_string()),
            invoice_date: Set(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()),
            due_date: Set(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()),
            amount: Set(Decimal::new(85000, 2)),
            paid_amount: Set(Decimal::ZERO),
            status: Set(payable::PayableStatus::Pending),
            ledger_entry_id: Set(Some(debit_entry.id)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let tier = commission_tier::ActiveModel {
            name: Set("silver".to_string()),
            min_sales: Set(Decimal::new(100000000, 4)), // 10000.0000
            rate: Set(Decimal::new(750, 4)),            // 0.0750
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let commission = sales_commission::ActiveModel {
            salesperson_id: Set(7),
            period_start: Set(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            period_end: Set(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
            total_sales: Set(Decimal::new(180000000, 4)),
            tier_name: Set(Some(tier.name.clone())),
            rate: Set(tier.rate),
            commission_amount: Set(Decimal::new(13500000, 4)),
            status: Set(sales_commission::CommissionStatus::Accrued),
            ledger_entry_id: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let campaign = marketing_campaign::ActiveModel {
            name: Set("Spring sale".to_string()),
            starts_on: Set(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            ends_on: Set(None),
            budget: Set(Decimal::new(500000, 2)),
            attributed_revenue: Set(Decimal::ZERO),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        marketing_expense::ActiveModel {
            campaign_id: Set(Some(campaign.id)),
            expense_date: Set(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            description: Set("Banner placement".to_string()),
            amount: Set(Decimal::new(120000, 2)),
            ledger_entry_id: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify
        let entries = LedgerEntry::find()
            .filter(ledger_entry::Column::JournalId.eq(journal.id))
            .all(&db)
            .await?;
        assert_eq!(entries.len(), 2);
        let debits: Decimal = entries.iter().map(|e| e.debit).sum();
        let credits: Decimal = entries.iter().map(|e| e.credit).sum();
        assert_eq!(debits, credits);

        let payables = Payable::find().all(&db).await?;
        assert_eq!(payables.len(), 1);
        assert_eq!(payables[0].id, payable.id);
        assert_eq!(payables[0].status, payable::PayableStatus::Pending);

        let commissions = SalesCommission::find().all(&db).await?;
        assert_eq!(commissions.len(), 1);
        assert_eq!(commissions[0].id, commission.id);
        assert_eq!(commissions[0].tier_name.as_deref(), Some("silver"));

        // Cascade: deleting the cash account removes its posting but
        // leaves the sales side untouched.
        Account::delete_by_id(cash.id).exec(&db).await?;
        let remaining = LedgerEntry::find().all(&db).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].account_id, sales.id);

        // Set-null: the payable survives with its ledger link cleared.
        let payable = Payable::find_by_id(payable.id)
            .one(&db)
            .await?
            .expect("payable should survive account deletion");
        assert_eq!(payable.ledger_entry_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_account_code_rejected() -> Result<(), DbErr> {
        let db = setup_db().await?;

        account::ActiveModel {
            code: Set("4000".to_string()),
            name: Set("Product Sales".to_string()),
            account_type: Set(account::AccountType::Revenue),
            description: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let duplicate = account::ActiveModel {
            code: Set("4000".to_string()),
            name: Set("Product Sales again".to_string()),
            account_type: Set(account::AccountType::Revenue),
            description: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await;

        assert!(duplicate.is_err());
        let err = duplicate.unwrap_err();
        assert!(matches!(
            err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ));

        Ok(())
    }
}
