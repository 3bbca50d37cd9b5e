use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a customer invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ReceivableStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Partial")]
    Partial,
    #[sea_orm(string_value = "Received")]
    Received,
    #[sea_orm(string_value = "Overdue")]
    Overdue,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// An amount a customer owes the marketplace (accounts receivable
/// sub-ledger). Mirror of [`super::payable`] on the receiving side.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "receivables")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_name: String,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub invoice_date: Date,
    pub due_date: Date,
    pub amount: Decimal,
    pub received_amount: Decimal,
    pub status: ReceivableStatus,
    pub ledger_entry_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger_entry::Entity",
        from = "Column::LedgerEntryId",
        to = "super::ledger_entry::Column::Id"
    )]
    LedgerEntry,
}

impl Related<super::ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
