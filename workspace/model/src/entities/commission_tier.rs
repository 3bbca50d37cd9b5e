use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A sales-total threshold mapping to a commission rate.
///
/// Tier selection picks the tier with the largest `min_sales` that does
/// not exceed the salesperson's total (see `compute::commission`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "commission_tiers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub min_sales: Decimal,
    /// Fraction, e.g. 0.075 for 7.5%.
    pub rate: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
