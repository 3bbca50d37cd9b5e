use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ReportType {
    #[sea_orm(string_value = "IncomeStatement")]
    IncomeStatement,
    #[sea_orm(string_value = "BalanceSheet")]
    BalanceSheet,
    #[sea_orm(string_value = "TrialBalance")]
    TrialBalance,
}

/// A write-once snapshot of computed report figures for a period.
///
/// `figures` holds the serialized `common::ReportFigures` exactly as
/// computed at generation time; regenerating for the same period on an
/// unchanged ledger yields an identical snapshot.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub report_type: ReportType,
    pub period_start: Date,
    pub period_end: Date,
    #[sea_orm(column_type = "Text")]
    pub figures: String,
    pub generated_by: String,
    pub generated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
