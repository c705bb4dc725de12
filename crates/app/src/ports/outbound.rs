//! Outbound delivery ports — email and webhook side effects.

use std::future::Future;

use pageforge_domain::automation::WebhookCallMethod;
use pageforge_domain::error::PageForgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully resolved email, templates already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub from: Option<String>,
    pub reply_to: Option<String>,
}

/// A fully resolved outbound HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub url: String,
    pub method: WebhookCallMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Delivers outbound email.
pub trait Mailer {
    /// Send one message.
    fn send(&self, message: EmailMessage)
    -> impl Future<Output = Result<(), PageForgeError>> + Send;
}

/// Performs outbound HTTP calls for webhook actions.
pub trait WebhookDispatcher {
    /// Dispatch one request, treating non-success status codes as errors.
    fn dispatch(
        &self,
        request: WebhookRequest,
    ) -> impl Future<Output = Result<(), PageForgeError>> + Send;
}
