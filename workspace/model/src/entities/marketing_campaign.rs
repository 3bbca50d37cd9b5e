use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A marketing campaign with a budget and attributed revenue.
///
/// The spent total is not stored; it is derived from the campaign's
/// expenses so the two cannot drift apart.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "marketing_campaigns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub starts_on: Date,
    pub ends_on: Option<Date>,
    pub budget: Decimal,
    pub attributed_revenue: Decimal,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::marketing_expense::Entity")]
    MarketingExpense,
}

impl Related<super::marketing_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MarketingExpense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
