pub mod accounts;
pub mod automation;
pub mod campaigns;
pub mod commissions;
pub mod health;
pub mod ledger;
pub mod payables;
pub mod receivables;
pub mod reports;
