//! Shared helpers for the compute test modules: an in-memory database
//! with migrations applied plus a small seeded chart of accounts.

use migration::{Migrator, MigratorTrait};
use model::entities::{account, commission_tier};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};

pub(crate) async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// The accounts most tests need, mirroring the demo chart.
pub(crate) struct Chart {
    pub cash: account::Model,
    pub receivable_control: account::Model,
    pub payable_control: account::Model,
    pub retained_earnings: account::Model,
    pub sales: account::Model,
    pub cogs: account::Model,
    pub marketing: account::Model,
}

pub(crate) async fn create_account(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    account_type: account::AccountType,
) -> account::Model {
    account::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        account_type: Set(account_type),
        description: Set(None),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create account")
}

pub(crate) async fn seed_chart(db: &DatabaseConnection) -> Chart {
    use account::AccountType::*;

    Chart {
        cash: create_account(db, "1000", "Cash", Asset).await,
        receivable_control: create_account(db, "1200", "Accounts Receivable", Asset).await,
        payable_control: create_account(db, "2000", "Accounts Payable", Liability).await,
        retained_earnings: create_account(db, "3900", "Retained Earnings", Equity).await,
        sales: create_account(db, "4000", "Product Sales", Revenue).await,
        cogs: create_account(db, "5000", "Cost of Goods Sold", Expense).await,
        marketing: create_account(db, "6000", "Marketing Expense", Expense).await,
    }
}

/// The bronze/silver/gold tiers used throughout the commission tests.
pub(crate) async fn seed_tiers(db: &DatabaseConnection) -> Vec<commission_tier::Model> {
    let mut tiers = Vec::new();
    for (name, min_sales, rate) in [
        ("bronze", Decimal::ZERO, Decimal::new(500, 4)),
        ("silver", Decimal::new(10000, 0), Decimal::new(750, 4)),
        ("gold", Decimal::new(25000, 0), Decimal::new(1000, 4)),
    ] {
        let tier = commission_tier::ActiveModel {
            name: Set(name.to_string()),
            min_sales: Set(min_sales),
            rate: Set(rate),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create tier");
        tiers.push(tier);
    }
    tiers
}
