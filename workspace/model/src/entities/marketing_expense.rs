use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A marketing expense, optionally attributed to a campaign and backed by
/// a ledger posting. Deleting a campaign detaches its expenses instead of
/// deleting them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "marketing_expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub campaign_id: Option<i32>,
    pub expense_date: Date,
    pub description: String,
    pub amount: Decimal,
    pub ledger_entry_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::marketing_campaign::Entity",
        from = "Column::CampaignId",
        to = "super::marketing_campaign::Column::Id"
    )]
    MarketingCampaign,
    #[sea_orm(
        belongs_to = "super::ledger_entry::Entity",
        from = "Column::LedgerEntryId",
        to = "super::ledger_entry::Column::Id"
    )]
    LedgerEntry,
}

impl Related<super::marketing_campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MarketingCampaign.def()
    }
}

impl Related<super::ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
