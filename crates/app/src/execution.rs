//! Execution records — the audit trail of automation runs.

use pageforge_domain::automation::Facts;
use pageforge_domain::id::{AutomationId, ExecutionId};
use pageforge_domain::time::Timestamp;
use serde::{Deserialize, Serialize};

/// How one action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Succeeded,
    Skipped,
    Failed,
}

/// Result of one action within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub action: String,
    pub status: ActionStatus,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Facts produced by a rules-engine action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<Facts>,
}

/// How a whole run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Succeeded,
    /// At least one action failed, others ran.
    Partial,
    Failed,
}

/// One completed automation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: ExecutionId,
    pub automation_id: AutomationId,
    pub automation_name: String,
    /// Display form of the event source that fired the run.
    pub source: String,
    pub status: ExecutionStatus,
    pub outcomes: Vec<ActionOutcome>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl ExecutionRecord {
    /// Derive the run status from its action outcomes. Skipped actions do
    /// not count against success.
    #[must_use]
    pub fn status_of(outcomes: &[ActionOutcome]) -> ExecutionStatus {
        let failed = outcomes
            .iter()
            .filter(|o| o.status == ActionStatus::Failed)
            .count();
        if failed == 0 {
            ExecutionStatus::Succeeded
        } else if failed == outcomes.len() {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Partial
        }
    }
}
