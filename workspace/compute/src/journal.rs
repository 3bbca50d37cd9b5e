use chrono::{NaiveDate, Utc};
use model::entities::ledger_entry::ReferenceType;
use model::entities::{account, journal, ledger_entry};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, instrument};

use crate::error::{LedgerError, Result};

/// One line of a journal to be posted: exactly one of `debit`/`credit`
/// must be positive, the other zero.
#[derive(Debug, Clone)]
pub struct JournalLine {
    pub account_id: i32,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl JournalLine {
    pub fn debit(account_id: i32, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    pub fn credit(account_id: i32, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

/// The journal row and its ledger entries as inserted.
#[derive(Debug, Clone)]
pub struct PostedJournal {
    pub journal: journal::Model,
    pub entries: Vec<ledger_entry::Model>,
}

/// Look up an account by its chart-of-accounts code.
pub async fn account_by_code<C: ConnectionTrait>(conn: &C, code: &str) -> Result<account::Model> {
    account::Entity::find()
        .filter(account::Column::Code.eq(code))
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::Validation(format!("no account with code {code}")))
}

fn validate_lines(lines: &[JournalLine]) -> Result<()> {
    if lines.len() < 2 {
        return Err(LedgerError::Validation(
            "a journal needs at least two lines".to_string(),
        ));
    }

    let mut debits = Decimal::ZERO;
    let mut credits = Decimal::ZERO;
    for line in lines {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "negative amount on account {}",
                line.account_id
            )));
        }
        let has_debit = line.debit > Decimal::ZERO;
        let has_credit = line.credit > Decimal::ZERO;
        if has_debit == has_credit {
            return Err(LedgerError::Validation(format!(
                "exactly one of debit/credit must be set on account {}",
                line.account_id
            )));
        }
        debits += line.debit;
        credits += line.credit;
    }

    if debits != credits {
        return Err(LedgerError::NotBalanced { debits, credits });
    }
    Ok(())
}

/// Inserts a journal and its entries on an existing connection, without
/// opening a transaction. Callers that are not already inside one should
/// use [`post_journal`].
pub async fn post_journal_with_conn<C: ConnectionTrait>(
    conn: &C,
    entry_date: NaiveDate,
    description: &str,
    reference_type: ReferenceType,
    reference_id: Option<i32>,
    lines: &[JournalLine],
) -> Result<PostedJournal> {
    validate_lines(lines)?;

    for line in lines {
        account::Entity::find_by_id(line.account_id)
            .one(conn)
            .await?
            .ok_or(LedgerError::NotFound {
                entity: "account",
                id: line.account_id,
            })?;
    }

    let posted_at = Utc::now();
    let journal = journal::ActiveModel {
        description: Set(description.to_string()),
        posted_at: Set(posted_at),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let mut entries = Vec::with_capacity(lines.len());
    for line in lines {
        let entry = ledger_entry::ActiveModel {
            account_id: Set(line.account_id),
            journal_id: Set(journal.id),
            entry_date: Set(entry_date),
            description: Set(description.to_string()),
            debit: Set(line.debit),
            credit: Set(line.credit),
            reference_type: Set(reference_type),
            reference_id: Set(reference_id),
            posted_at: Set(posted_at),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        entries.push(entry);
    }

    debug!(
        journal_id = journal.id,
        entry_count = entries.len(),
        "Posted journal"
    );

    Ok(PostedJournal { journal, entries })
}

/// Posts one balanced business transaction to the general ledger.
///
/// All lines are inserted atomically: either the whole journal lands or
/// nothing does. Single unmatched entries are rejected, so the ledger
/// stays balanced by construction.
#[instrument(skip(db, lines), fields(line_count = lines.len()))]
pub async fn post_journal(
    db: &DatabaseConnection,
    entry_date: NaiveDate,
    description: &str,
    reference_type: ReferenceType,
    reference_id: Option<i32>,
    lines: &[JournalLine],
) -> Result<PostedJournal> {
    let txn = db.begin().await?;
    let posted =
        post_journal_with_conn(&txn, entry_date, description, reference_type, reference_id, lines)
            .await?;
    txn.commit().await?;
    Ok(posted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_chart, setup_db};
    use model::entities::prelude::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[tokio::test]
    async fn balanced_journal_posts_atomically() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let posted = post_journal(
            &db,
            date,
            "Order #77 settled",
            ReferenceType::Order,
            Some(77),
            &[
                JournalLine::debit(chart.cash.id, dec(125000, 2)),
                JournalLine::credit(chart.sales.id, dec(125000, 2)),
            ],
        )
        .await
        .expect("balanced journal should post");

        assert_eq!(posted.entries.len(), 2);
        let entries = LedgerEntry::find().all(&db).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.journal_id == posted.journal.id));
    }

    #[tokio::test]
    async fn unbalanced_journal_is_rejected_and_nothing_lands() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let result = post_journal(
            &db,
            date,
            "typo in the credit side",
            ReferenceType::Manual,
            None,
            &[
                JournalLine::debit(chart.cash.id, dec(125000, 2)),
                JournalLine::credit(chart.sales.id, dec(125100, 2)),
            ],
        )
        .await;

        assert!(matches!(result, Err(LedgerError::NotBalanced { .. })));
        assert_eq!(LedgerEntry::find().all(&db).await.unwrap().len(), 0);
        assert_eq!(Journal::find().all(&db).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn single_line_journal_is_rejected() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let result = post_journal(
            &db,
            date,
            "unmatched entry",
            ReferenceType::Manual,
            None,
            &[JournalLine::credit(chart.sales.id, dec(100000, 2))],
        )
        .await;

        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn line_with_both_sides_set_is_rejected() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let result = post_journal(
            &db,
            date,
            "both sides",
            ReferenceType::Manual,
            None,
            &[
                JournalLine {
                    account_id: chart.cash.id,
                    debit: dec(100, 2),
                    credit: dec(100, 2),
                },
                JournalLine::credit(chart.sales.id, Decimal::ZERO),
            ],
        )
        .await;

        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_account_fails_with_not_found() {
        let db = setup_db().await;
        let chart = seed_chart(&db).await;

        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let result = post_journal(
            &db,
            date,
            "ghost account",
            ReferenceType::Manual,
            None,
            &[
                JournalLine::debit(9999, dec(5000, 2)),
                JournalLine::credit(chart.sales.id, dec(5000, 2)),
            ],
        )
        .await;

        assert!(matches!(
            result,
            Err(LedgerError::NotFound {
                entity: "account",
                id: 9999
            })
        ));
        assert_eq!(LedgerEntry::find().all(&db).await.unwrap().len(), 0);
    }
}
