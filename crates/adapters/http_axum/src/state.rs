//! Shared application state for axum handlers.

use std::sync::Arc;

use pageforge_app::automation_engine::AutomationEngine;
use pageforge_app::ports::{
    AutomationRepository, EventPublisher, ExecutionLog, Mailer, WebhookDispatcher,
};
use pageforge_app::services::automation_service::AutomationService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository, outbound delivery, execution log, and event
/// publisher types to avoid dynamic dispatch. `Clone` is implemented manually
/// so the underlying types themselves do not need to be `Clone` — only the
/// `Arc` wrappers are cloned.
pub struct AppState<AR, M, W, L, P> {
    /// Automation CRUD and execution history service.
    pub automation_service: Arc<AutomationService<AR, L>>,
    /// Automation engine for manual runs and inbound webhooks.
    pub engine: Arc<AutomationEngine<AR, M, W, L, P>>,
}

impl<AR, M, W, L, P> Clone for AppState<AR, M, W, L, P> {
    fn clone(&self) -> Self {
        Self {
            automation_service: Arc::clone(&self.automation_service),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<AR, M, W, L, P> AppState<AR, M, W, L, P>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc`s.
    ///
    /// The engine is shared with background tasks (event loop, scheduler),
    /// so it is always constructed as an `Arc` first.
    pub fn new(
        automation_service: Arc<AutomationService<AR, L>>,
        engine: Arc<AutomationEngine<AR, M, W, L, P>>,
    ) -> Self {
        Self {
            automation_service,
            engine,
        }
    }
}
