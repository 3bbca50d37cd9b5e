use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of business document a posting refers back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ReferenceType {
    #[sea_orm(string_value = "Order")]
    Order,
    #[sea_orm(string_value = "Invoice")]
    Invoice,
    #[sea_orm(string_value = "Payment")]
    Payment,
    #[sea_orm(string_value = "Commission")]
    Commission,
    #[sea_orm(string_value = "Expense")]
    Expense,
    #[sea_orm(string_value = "Manual")]
    Manual,
    #[sea_orm(string_value = "Closing")]
    Closing,
}

/// A single debit or credit posting in the general ledger.
///
/// Entries are append-only: they are created once via a balanced journal
/// and never updated. The only deletion path is the cascade from their
/// account. Exactly one of `debit`/`credit` is non-zero per entry,
/// enforced at journal-posting time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub account_id: i32,
    pub journal_id: i32,
    pub entry_date: Date,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub reference_type: ReferenceType,
    /// Id of the referenced order/invoice/payment row, if any.
    pub reference_id: Option<i32>,
    pub posted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::journal::Entity",
        from = "Column::JournalId",
        to = "super::journal::Column::Id"
    )]
    Journal,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::journal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
