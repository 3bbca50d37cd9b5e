use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use model::entities::account::{self, AccountType};
use model::entities::commission_tier;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, info};

const DEMO_ACCOUNTS: &[(&str, &str, AccountType)] = &[
    ("1000", "Cash", AccountType::Asset),
    ("1200", "Accounts receivable", AccountType::Asset),
    ("2000", "Accounts payable", AccountType::Liability),
    ("3000", "Owner equity", AccountType::Equity),
    ("3900", "Retained earnings", AccountType::Equity),
    ("4000", "Sales revenue", AccountType::Revenue),
    ("5000", "Cost of goods sold", AccountType::Expense),
    ("6000", "Marketing expense", AccountType::Expense),
];

pub async fn seed_demo(database_url: &str) -> Result<()> {
    info!("Seeding demo chart of accounts and commission tiers");
    debug!("Database URL: {}", database_url);

    let db: DatabaseConnection = Database::connect(database_url).await?;
    Migrator::up(&db, None).await?;

    let mut created_accounts = 0;
    for (code, name, account_type) in DEMO_ACCOUNTS {
        let existing = account::Entity::find()
            .filter(account::Column::Code.eq(*code))
            .one(&db)
            .await?;
        if existing.is_some() {
            debug!("Account {} already exists, skipping", code);
            continue;
        }

        account::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            account_type: Set(*account_type),
            description: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        created_accounts += 1;
    }

    let demo_tiers = [
        ("bronze", Decimal::ZERO, Decimal::new(500, 4)),
        ("silver", Decimal::new(10_000, 0), Decimal::new(750, 4)),
        ("gold", Decimal::new(25_000, 0), Decimal::new(1000, 4)),
    ];

    let mut created_tiers = 0;
    for (name, min_sales, rate) in demo_tiers {
        let existing = commission_tier::Entity::find()
            .filter(commission_tier::Column::Name.eq(name))
            .one(&db)
            .await?;
        if existing.is_some() {
            debug!("Tier {} already exists, skipping", name);
            continue;
        }

        commission_tier::ActiveModel {
            name: Set(name.to_string()),
            min_sales: Set(min_sales),
            rate: Set(rate),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        created_tiers += 1;
    }

    info!(
        "Demo seed completed: {} accounts and {} tiers created",
        created_accounts, created_tiers
    );
    Ok(())
}
