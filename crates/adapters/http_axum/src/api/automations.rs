//! JSON REST handlers for automations.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use pageforge_app::execution::ExecutionRecord;
use pageforge_app::ports::{
    AutomationRepository, EventPublisher, ExecutionLog, Mailer, WebhookDispatcher,
};
use pageforge_domain::automation::{Action, Automation, Trigger};
use pageforge_domain::error::{PageForgeError, ValidationError};
use pageforge_domain::id::AutomationId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an automation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAutomationRequest {
    pub name: String,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    pub retry_on_failure: Option<bool>,
    pub max_retries: Option<u32>,
    pub log_executions: Option<bool>,
}

/// Request body for updating an automation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAutomationRequest {
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    pub retry_on_failure: bool,
    pub max_retries: u32,
    pub log_executions: bool,
}

/// Request body for a manual run. The payload becomes the event data.
#[derive(Deserialize, Default)]
pub struct RunRequest {
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Query parameters for the execution history endpoint.
#[derive(Deserialize)]
pub struct ExecutionsQuery {
    pub limit: Option<u32>,
}

/// Query parameters for the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    pub enabled: Option<bool>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Automation>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Automation>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Automation>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the manual run endpoint.
pub enum RunResponse {
    Ok(Json<ExecutionRecord>),
}

impl IntoResponse for RunResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the executions endpoint.
pub enum ExecutionsResponse {
    Ok(Json<Vec<ExecutionRecord>>),
}

impl IntoResponse for ExecutionsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<AutomationId, ApiError> {
    AutomationId::from_str(id).map_err(|_| {
        ApiError::from(PageForgeError::Validation(ValidationError::InvalidId {
            value: id.to_string(),
        }))
    })
}

/// `GET /api/automations` — list automations, optionally only enabled ones.
pub async fn list<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let automations = if query.enabled == Some(true) {
        state.automation_service.list_enabled().await?
    } else {
        state.automation_service.list_automations().await?
    };
    Ok(ListResponse::Ok(Json(automations)))
}

/// `GET /api/automations/:id` — get automation by ID.
pub async fn get<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    let automation = state
        .automation_service
        .get_automation(automation_id)
        .await?;
    Ok(GetResponse::Ok(Json(automation)))
}

/// `POST /api/automations` — create a new automation.
pub async fn create<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Json(req): Json<CreateAutomationRequest>,
) -> Result<CreateResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let mut builder = Automation::builder().name(req.name).trigger(req.trigger);

    if let Some(description) = req.description {
        builder = builder.description(description);
    }
    if let Some(enabled) = req.enabled {
        builder = builder.enabled(enabled);
    }
    if let Some(retry) = req.retry_on_failure {
        builder = builder.retry_on_failure(retry);
    }
    if let Some(retries) = req.max_retries {
        builder = builder.max_retries(retries);
    }
    if let Some(log) = req.log_executions {
        builder = builder.log_executions(log);
    }
    for a in req.actions {
        builder = builder.action(a);
    }

    let automation = builder.build()?;
    let created = state
        .automation_service
        .create_automation(automation)
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/automations/:id` — update an existing automation.
pub async fn update<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAutomationRequest>,
) -> Result<GetResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;

    // Verify it exists
    let existing = state
        .automation_service
        .get_automation(automation_id)
        .await?;

    let mut builder = Automation::builder()
        .id(automation_id)
        .name(req.name)
        .enabled(req.enabled)
        .trigger(req.trigger)
        .retry_on_failure(req.retry_on_failure)
        .max_retries(req.max_retries)
        .log_executions(req.log_executions);

    if let Some(description) = req.description {
        builder = builder.description(description);
    }
    if let Some(last) = existing.last_triggered {
        builder = builder.last_triggered(last);
    }
    for a in req.actions {
        builder = builder.action(a);
    }

    let automation = builder.build()?;
    let updated = state
        .automation_service
        .update_automation(automation)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/automations/:id` — delete an automation.
pub async fn delete<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    state
        .automation_service
        .delete_automation(automation_id)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/automations/:id/run` — run an automation by hand.
pub async fn run<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Path(id): Path<String>,
    body: Option<Json<RunRequest>>,
) -> Result<RunResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    let payload = body.map(|Json(req)| req.payload).unwrap_or_default();
    let record = state.engine.run_manual(automation_id, payload).await?;
    Ok(RunResponse::Ok(Json(record)))
}

/// `GET /api/automations/:id/executions` — recent runs, newest first.
pub async fn executions<AR, M, W, L, P>(
    State(state): State<AppState<AR, M, W, L, P>>,
    Path(id): Path<String>,
    Query(query): Query<ExecutionsQuery>,
) -> Result<ExecutionsResponse, ApiError>
where
    AR: AutomationRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    W: WebhookDispatcher + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let automation_id = parse_id(&id)?;
    let limit = query.limit.unwrap_or(20).min(100);
    let records = state
        .automation_service
        .recent_executions(automation_id, limit)
        .await?;
    Ok(ExecutionsResponse::Ok(Json(records)))
}
