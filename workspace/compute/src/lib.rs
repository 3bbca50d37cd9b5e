//! Business logic of the back-office accounting subsystem.
//!
//! Everything here operates on the entities from the `model` crate through
//! a sea-orm connection. The general ledger is the single source of truth:
//! balances and report figures are always derived by summing postings, and
//! every write path that touches more than one row runs inside one database
//! transaction.

pub mod automation;
pub mod balance;
pub mod commission;
pub mod error;
pub mod journal;
pub mod marketing;
pub mod report;
pub mod settlement;

pub use error::{LedgerError, Result};

#[cfg(test)]
pub(crate) mod testing;
