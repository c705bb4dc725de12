//! Inbound webhook endpoint for webhook-triggered automations.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::Serialize;

use pageforge_app::ports::{
    AutomationRepository, EventPublisher, ExecutionLog, Mailer, WebhookDispatcher,
};
use pageforge_domain::automation::WebhookMethod;
use pageforge_domain::id::AutomationId;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared secret for protected webhook triggers.
pub const SECRET_HEADER: &str = "x-webhook-secret";

/// Body returned after a webhook delivery was accepted.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAccepted {
    pub triggered: Vec<AutomationId>,
}

/// `POST /api/webhooks/automations/:path` — deliver a webhook payload.
pub async fn receive_post<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Option<Json<serde_json::Value>>,
) -> Result<Json<WebhookAccepted>, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    receive(state, path, WebhookMethod::Post, &headers, body).await
}

/// `GET /api/webhooks/automations/:path` — deliver a payload-less webhook.
pub async fn receive_get<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Json<WebhookAccepted>, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    receive(state, path, WebhookMethod::Get, &headers, None).await
}

async fn receive<AR, M, W, L, P>(
    state: AppState<AR, M, W, L, P>,
    path: String,
    method: WebhookMethod,
    headers: &HeaderMap,
    body: Option<Json<serde_json::Value>>,
) -> Result<Json<WebhookAccepted>, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let secret = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    let payload = body.map(|Json(value)| value).unwrap_or_default();

    let triggered = state
        .engine
        .process_webhook(&path, method, secret, payload)
        .await?;
    Ok(Json(WebhookAccepted { triggered }))
}
