use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The accounting classification of an account.
///
/// Asset and Expense accounts are debit-normal; Liability, Equity and
/// Revenue accounts are credit-normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum AccountType {
    #[sea_orm(string_value = "Asset")]
    Asset,
    #[sea_orm(string_value = "Liability")]
    Liability,
    #[sea_orm(string_value = "Equity")]
    Equity,
    #[sea_orm(string_value = "Revenue")]
    Revenue,
    #[sea_orm(string_value = "Expense")]
    Expense,
}

/// A node in the chart of accounts.
///
/// There is no cached balance column: the balance of an account is always
/// derived from its ledger entries (see the compute crate). `account_type`
/// is immutable once postings exist against the account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique account code, e.g. "4000".
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub description: Option<String>,
    /// Inactive accounts are hidden from the default listing but keep
    /// their postings.
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Deleting an account cascades to its postings.
    #[sea_orm(has_many = "super::ledger_entry::Entity")]
    LedgerEntry,
}

impl Related<super::ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
