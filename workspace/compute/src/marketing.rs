use common::CampaignRoi;
use model::entities::{marketing_campaign, marketing_expense};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{instrument, trace};

use crate::error::{LedgerError, Result};

/// Sums a campaign's expenses. The spent total is never stored, so it
/// cannot drift from the expense records.
pub async fn campaign_spent<C: ConnectionTrait>(conn: &C, campaign_id: i32) -> Result<Decimal> {
    let expenses = marketing_expense::Entity::find()
        .filter(marketing_expense::Column::CampaignId.eq(campaign_id))
        .all(conn)
        .await?;
    Ok(expenses.iter().fold(Decimal::ZERO, |acc, e| acc + e.amount))
}

/// Derives the ROI figures for a campaign: spent from the expense
/// sub-ledger, `roi = (attributed_revenue - spent) / spent` once anything
/// has been spent.
#[instrument(skip(conn))]
pub async fn campaign_roi<C: ConnectionTrait>(conn: &C, campaign_id: i32) -> Result<CampaignRoi> {
    let campaign = marketing_campaign::Entity::find_by_id(campaign_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "marketing campaign",
            id: campaign_id,
        })?;

    let spent = campaign_spent(conn, campaign.id).await?;
    let roi = if spent > Decimal::ZERO {
        Some((campaign.attributed_revenue - spent) / spent)
    } else {
        None
    };

    trace!(campaign = %campaign.name, %spent, ?roi, "Derived campaign ROI");

    Ok(CampaignRoi {
        campaign_id: campaign.id,
        name: campaign.name,
        budget: campaign.budget,
        spent,
        attributed_revenue: campaign.attributed_revenue,
        roi,
    })
}
