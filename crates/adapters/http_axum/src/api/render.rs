//! Block rendering endpoint.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use pageforge_app::block_renderer::{RenderOptions, render_page};
use pageforge_app::ports::{
    AutomationRepository, EventPublisher, ExecutionLog, Mailer, WebhookDispatcher,
};
use pageforge_domain::block::Block;
use pageforge_domain::render::RenderedPage;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub class_name: Option<String>,
}

/// `POST /api/render` — map a page's block records to render nodes.
///
/// The response always has one node per input block, in order.
pub async fn render<AR, M, W, L, P>(
    State(_state): State<AppState<AR, M, W, L, P>>,
    Json(request): Json<RenderRequest>,
) -> Json<RenderedPage>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let options = RenderOptions {
        class_name: request.class_name,
    };
    Json(render_page(&request.blocks, options))
}
