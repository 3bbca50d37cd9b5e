use model::entities::{commission_tier, sales_commission};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set,
    TransactionTrait,
};
use tracing::{debug, instrument};

use crate::error::{LedgerError, Result};

/// Selects the commission tier for a sales total: the tier with the
/// largest `min_sales` threshold not exceeding `total_sales` wins, ties
/// on equal thresholds resolved by taking the first after the descending
/// sort. Selection is monotonic in `total_sales` by construction.
pub fn select_tier(
    tiers: &[commission_tier::Model],
    total_sales: Decimal,
) -> Option<&commission_tier::Model> {
    let mut ordered: Vec<&commission_tier::Model> = tiers.iter().collect();
    ordered.sort_by(|a, b| b.min_sales.cmp(&a.min_sales));
    ordered.into_iter().find(|tier| tier.min_sales <= total_sales)
}

/// Re-derives tier, rate and (unless an explicit amount is given) the
/// commission amount from the record's current `total_sales`.
///
/// Callers invoke it inside the same transaction as any write to
/// `total_sales`, so the stored assignment can never lag the total.
pub async fn assign_tier<C: ConnectionTrait>(
    conn: &C,
    commission: sales_commission::Model,
    explicit_amount: Option<Decimal>,
) -> Result<sales_commission::Model> {
    let tiers = commission_tier::Entity::find().all(conn).await?;
    let selected = select_tier(&tiers, commission.total_sales);

    let (tier_name, rate) = match selected {
        Some(tier) => (Some(tier.name.clone()), tier.rate),
        None => (None, Decimal::ZERO),
    };
    let amount = explicit_amount.unwrap_or(commission.total_sales * rate);

    debug!(
        commission_id = commission.id,
        ?tier_name,
        %rate,
        %amount,
        "Assigned commission tier"
    );

    let mut active = commission.into_active_model();
    active.tier_name = Set(tier_name);
    active.rate = Set(rate);
    active.commission_amount = Set(amount);
    Ok(active.update(conn).await?)
}

/// Updates a commission record's sales total and re-runs tier assignment
/// in the same transaction.
#[instrument(skip(db))]
pub async fn update_total_sales(
    db: &DatabaseConnection,
    commission_id: i32,
    total_sales: Decimal,
) -> Result<sales_commission::Model> {
    if total_sales < Decimal::ZERO {
        return Err(LedgerError::Validation(
            "total_sales cannot be negative".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let commission = sales_commission::Entity::find_by_id(commission_id)
        .one(&txn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "sales commission",
            id: commission_id,
        })?;

    let mut active = commission.into_active_model();
    active.total_sales = Set(total_sales);
    let updated = active.update(&txn).await?;

    let updated = assign_tier(&txn, updated, None).await?;

    txn.commit().await?;
    Ok(updated)
}
