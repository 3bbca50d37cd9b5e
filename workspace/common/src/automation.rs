use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of a single automation task within a run.
///
/// A failed task never aborts the run; its failure is recorded here and
/// the runner moves on to the next task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskOutcome {
    /// Stable task name, e.g. "tier_progression".
    pub task: String,
    pub success: bool,
    /// Human-readable summary: affected row counts on success, the error
    /// message on failure.
    pub detail: String,
}

impl TaskOutcome {
    pub fn ok(task: &str, detail: impl Into<String>) -> Self {
        Self {
            task: task.to_string(),
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(task: &str, detail: impl Into<String>) -> Self {
        Self {
            task: task.to_string(),
            success: false,
            detail: detail.into(),
        }
    }
}

/// Summary of one automation run, mirroring the persisted audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AutomationRunSummary {
    pub run_id: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub triggered_by: String,
    pub outcomes: Vec<TaskOutcome>,
}
