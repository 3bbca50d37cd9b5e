use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a vendor invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PayableStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Partial")]
    Partial,
    #[sea_orm(string_value = "Paid")]
    Paid,
    #[sea_orm(string_value = "Overdue")]
    Overdue,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// An amount the marketplace owes a vendor (accounts payable sub-ledger).
///
/// `paid_amount` accumulates applied payments and can never exceed
/// `amount`; the transition to `Paid` happens when the two are equal.
/// Overdue is detected at read time from `due_date` and persisted by the
/// automation overdue scan.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payables")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub vendor_name: String,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub invoice_date: Date,
    pub due_date: Date,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub status: PayableStatus,
    /// Ledger posting that recorded the invoice, if one was made.
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
