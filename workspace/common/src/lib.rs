//! Common transport-layer types shared between the compute layer and the
//! HTTP API. These structs are the serialized shapes persisted in report
//! snapshots and returned by the back-office endpoints, so both sides
//! agree on them without duplicating definitions.

mod automation;
mod figures;

pub use automation::{AutomationRunSummary, TaskOutcome};
pub use figures::{CampaignRoi, ReportFigures, TrialBalanceLine};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An inclusive date range used for period-filtered balance queries and
/// report generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// True when `date` falls inside the range, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
