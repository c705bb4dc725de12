//! Execution log port — persistence for automation run records.

use std::future::Future;

use pageforge_domain::error::PageForgeError;
use pageforge_domain::id::AutomationId;

use crate::execution::ExecutionRecord;

/// Append-only store of automation execution records.
pub trait ExecutionLog {
    /// Append one completed run.
    fn append(
        &self,
        record: ExecutionRecord,
    ) -> impl Future<Output = Result<(), PageForgeError>> + Send;

    /// Most recent runs across all automations, newest first.
    fn recent(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, PageForgeError>> + Send;

    /// Most recent runs of one automation, newest first.
    fn recent_for(
        &self,
        automation_id: AutomationId,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, PageForgeError>> + Send;
}
