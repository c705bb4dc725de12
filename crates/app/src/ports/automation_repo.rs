//! Automation repository port — persistence for automations.

use std::future::Future;

use pageforge_domain::automation::Automation;
use pageforge_domain::error::PageForgeError;
use pageforge_domain::id::AutomationId;
use pageforge_domain::time::Timestamp;

/// Repository for persisting and querying [`Automation`]s.
pub trait AutomationRepository {
    /// Create a new automation in storage.
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, PageForgeError>> + Send;

    /// Get an automation by its unique identifier.
    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, PageForgeError>> + Send;

    /// Get all automations.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, PageForgeError>> + Send;

    /// Get all enabled automations.
    fn get_enabled(&self) -> impl Future<Output = Result<Vec<Automation>, PageForgeError>> + Send;

    /// Update an existing automation.
    fn update(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, PageForgeError>> + Send;

    /// Record when an automation last fired.
    fn set_last_triggered(
        &self,
        id: AutomationId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), PageForgeError>> + Send;

    /// Delete an automation by its unique identifier.
    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), PageForgeError>> + Send;
}
