//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod render;
#[allow(clippy::missing_errors_doc)]
pub mod webhooks;

use axum::Router;
use axum::routing::{get, post};

use pageforge_app::ports::{
    AutomationRepository, EventPublisher, ExecutionLog, Mailer, WebhookDispatcher,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<AR, M, W, L, P>() -> Router<AppState<AR, M, W, L, P>>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        // Automations
        .route(
            "/automations",
            get(automations::list::<AR, M, W, L, P>).post(automations::create::<AR, M, W, L, P>),
        )
        .route(
            "/automations/{id}",
            get(automations::get::<AR, M, W, L, P>)
                .put(automations::update::<AR, M, W, L, P>)
                .delete(automations::delete::<AR, M, W, L, P>),
        )
        .route(
            "/automations/{id}/run",
            post(automations::run::<AR, M, W, L, P>),
        )
        .route(
            "/automations/{id}/executions",
            get(automations::executions::<AR, M, W, L, P>),
        )
        // Rendering
        .route("/render", post(render::render::<AR, M, W, L, P>))
        // Inbound automation webhooks
        .route(
            "/webhooks/automations/{path}",
            post(webhooks::receive_post::<AR, M, W, L, P>)
                .get(webhooks::receive_get::<AR, M, W, L, P>),
        )
}
