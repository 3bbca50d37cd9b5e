use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum CommissionStatus {
    #[sea_orm(string_value = "Accrued")]
    Accrued,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Paid")]
    Paid,
}

/// A salesperson's commission for one period.
///
/// `tier_name`, `rate` and (unless explicitly supplied at creation)
/// `commission_amount` are derived from `total_sales` via the commission
/// tiers, re-evaluated in the application after every write to
/// `total_sales`. One row per (salesperson, period) so automation re-runs
/// stay idempotent.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sales_commissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub salesperson_id: i32,
    pub period_start: Date,
    pub period_end: Date,
    pub total_sales: Decimal,
    pub tier_name: Option<String>,
    pub rate: Decimal,
    pub commission_amount: Decimal,
    pub status: CommissionStatus,
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
