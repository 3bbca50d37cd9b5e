use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate figures computed from the general ledger for one period.
///
/// This is the payload persisted (serialized) in a financial report
/// snapshot. Income-statement style reports fill the flow figures over
/// the period window; balance-sheet reports compute everything
/// cumulatively through the period end so the accounting identity
/// `assets = liabilities + equity + net_income` can be checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportFigures {
    /// Net credit of all revenue accounts.
    pub revenue: Decimal,
    /// Net debit of all expense accounts.
    pub expenses: Decimal,
    /// `revenue - expenses`.
    pub net_income: Decimal,
    /// Net debit of all asset accounts.
    pub assets: Decimal,
    /// Net credit of all liability accounts.
    pub liabilities: Decimal,
    /// Net credit of all equity accounts.
    pub equity: Decimal,
    /// Per-account detail, populated for trial balance reports only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<TrialBalanceLine>,
}

/// One account row of a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrialBalanceLine {
    pub account_code: String,
    pub account_name: String,
    pub debit_total: Decimal,
    pub credit_total: Decimal,
    /// `credit_total - debit_total`.
    pub balance: Decimal,
}

/// Derived return-on-investment figures for a marketing campaign.
///
/// `spent` is always recomputed from the campaign's expenses; it is not
/// stored anywhere it could drift from the expense records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CampaignRoi {
    pub campaign_id: i32,
    pub name: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub attributed_revenue: Decimal,
    /// `(attributed_revenue - spent) / spent`, absent while nothing has
    /// been spent.
    pub roi: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_figures_roundtrip_omits_empty_lines() {
        let figures = ReportFigures {
            revenue: Decimal::new(465000, 2),
            expenses: Decimal::new(120000, 2),
            net_income: Decimal::new(345000, 2),
            assets: Decimal::new(345000, 2),
            liabilities: Decimal::ZERO,
            equity: Decimal::ZERO,
            lines: Vec::new(),
        };

        let json = serde_json::to_string(&figures).unwrap();
        assert!(!json.contains("lines"));

        let back: ReportFigures = serde_json::from_str(&json).unwrap();
        assert_eq!(back, figures);
    }
}
