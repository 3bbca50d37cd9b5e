use rust_decimal::Decimal;
use thiserror::Error;

/// Error types for the compute layer.
///
/// These map one-to-one onto the failure taxonomy of the back office:
/// store failures, missing entities, invalid input, unbalanced postings
/// and rejected settlements.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Error from the database operations. Unique-constraint violations
    /// are surfaced to callers as duplicate-key failures via
    /// [`sea_orm::DbErr::sql_err`].
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A referenced entity id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Missing or malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A journal whose debits and credits do not match, or a balance
    /// sheet whose sides disagree beyond tolerance.
    #[error("Not balanced: debits {debits} vs credits {credits}")]
    NotBalanced { debits: Decimal, credits: Decimal },

    /// A payment that would push the settled amount past the invoice
    /// total. The outstanding amount is what could still be applied.
    #[error("Overpayment on invoice {invoice}: attempted {attempted}, outstanding {outstanding}")]
    OverPayment {
        invoice: String,
        attempted: Decimal,
        outstanding: Decimal,
    },

    /// Error serializing report figures or task outcomes.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Result with LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;
