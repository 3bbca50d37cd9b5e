use common::DateRange;
use model::entities::{account, ledger_entry};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, instrument, trace};

use crate::error::{LedgerError, Result};

/// Derives an account balance as `SUM(credit) - SUM(debit)` over the
/// account's ledger entries, optionally restricted to a date range.
///
/// This is the only source of truth for balances: nothing in the system
/// stores a balance column that could drift from the postings. The sum
/// is invariant under insert order.
#[instrument(skip(conn), fields(account_id = account_id, range = ?range))]
pub async fn account_balance<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    range: Option<DateRange>,
) -> Result<Decimal> {
    let account = account::Entity::find_by_id(account_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "account",
            id: account_id,
        })?;

    let mut query =
        ledger_entry::Entity::find().filter(ledger_entry::Column::AccountId.eq(account.id));
    if let Some(range) = range {
        query = query.filter(
            Condition::all()
                .add(ledger_entry::Column::EntryDate.gte(range.start))
                .add(ledger_entry::Column::EntryDate.lte(range.end)),
        );
    }

    let entries = query.all(conn).await?;
    trace!(
        "Summing {} entries for account {}",
        entries.len(),
        account.code
    );

    let balance = entries
        .iter()
        .fold(Decimal::ZERO, |acc, e| acc + e.credit - e.debit);

    debug!(account_code = %account.code, %balance, "Derived account balance");
    Ok(balance)
}
