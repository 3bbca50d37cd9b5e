#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use model::entities::account::{self, AccountType};
    use model::entities::commission_tier;
    use moka::future::Cache;
    use rust_decimal::Decimal;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, with a small chart of accounts and
    /// the standard commission tiers already in place
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        let chart = [
            ("1000", "Cash", AccountType::Asset),
            ("1200", "Accounts receivable", AccountType::Asset),
            ("2000", "Accounts payable", AccountType::Liability),
            ("3900", "Retained earnings", AccountType::Equity),
            ("4000", "Sales revenue", AccountType::Revenue),
            ("5000", "Cost of goods sold", AccountType::Expense),
            ("6000", "Marketing expense", AccountType::Expense),
        ];
        for (code, name, account_type) in chart {
            account::ActiveModel {
                code: Set(code.to_string()),
                name: Set(name.to_string()),
                account_type: Set(account_type),
                description: Set(None),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&db)
            .await
            .expect("Failed to seed test account");
        }

        let tiers = [
            ("bronze", Decimal::ZERO, Decimal::new(500, 4)),
            ("silver", Decimal::new(10_000, 0), Decimal::new(750, 4)),
            ("gold", Decimal::new(25_000, 0), Decimal::new(1000, 4)),
        ];
        for (name, min_sales, rate) in tiers {
            commission_tier::ActiveModel {
                name: Set(name.to_string()),
                min_sales: Set(min_sales),
                rate: Set(rate),
                ..Default::default()
            }
            .insert(&db)
            .await
            .expect("Failed to seed test tier");
        }

        let cache = Cache::new(100);

        AppState { db, cache }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }
}
