//! `reqwest` implementation of [`WebhookDispatcher`].

use pageforge_app::ports::{WebhookDispatcher, WebhookRequest};
use pageforge_domain::automation::WebhookCallMethod;
use pageforge_domain::error::{DispatchError, PageForgeError};

/// Limit on how much of an error response body ends up in the error message.
const BODY_EXCERPT_LEN: usize = 256;

/// Webhook dispatcher backed by a shared [`reqwest::Client`].
pub struct ReqwestWebhookDispatcher {
    client: reqwest::Client,
}

impl ReqwestWebhookDispatcher {
    /// Create a dispatcher with its own connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a dispatcher from an existing client, sharing its pool.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestWebhookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut a response body down to the excerpt limit on a char boundary.
fn excerpt(mut body: String) -> String {
    if body.len() > BODY_EXCERPT_LEN {
        let mut cut = BODY_EXCERPT_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

fn method_of(method: WebhookCallMethod) -> reqwest::Method {
    match method {
        WebhookCallMethod::Post => reqwest::Method::POST,
        WebhookCallMethod::Put => reqwest::Method::PUT,
        WebhookCallMethod::Patch => reqwest::Method::PATCH,
        WebhookCallMethod::Get => reqwest::Method::GET,
        WebhookCallMethod::Delete => reqwest::Method::DELETE,
    }
}

impl WebhookDispatcher for ReqwestWebhookDispatcher {
    async fn dispatch(&self, request: WebhookRequest) -> Result<(), PageForgeError> {
        let mut builder = self.client.request(method_of(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| DispatchError::Transport {
                kind: "webhook",
                message: err.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(url = %request.url, status = %status, "webhook delivered");
            Ok(())
        } else {
            let body = excerpt(response.text().await.unwrap_or_default());
            Err(DispatchError::Rejected {
                kind: "webhook",
                message: format!("{status}: {body}"),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_report_transport_error_when_host_is_unreachable() {
        let dispatcher = ReqwestWebhookDispatcher::new();
        let request = WebhookRequest {
            url: "http://127.0.0.1:1/hook".to_string(),
            method: WebhookCallMethod::Post,
            headers: vec![],
            body: Some(serde_json::json!({"ping": true})),
        };

        let err = dispatcher.dispatch(request).await.unwrap_err();
        assert!(matches!(
            err,
            PageForgeError::Dispatch(DispatchError::Transport { kind: "webhook", .. })
        ));
    }

    #[test]
    fn should_cut_body_excerpt_on_a_char_boundary() {
        let body = "a".repeat(BODY_EXCERPT_LEN - 1) + "é and more";
        let cut = excerpt(body);
        // The two-byte char straddling the limit is dropped whole.
        assert_eq!(cut.len(), BODY_EXCERPT_LEN - 1);
        assert!(cut.chars().all(|c| c == 'a'));

        assert_eq!(excerpt("short".to_string()), "short");
    }

    #[test]
    fn should_map_call_methods_to_http_methods() {
        assert_eq!(method_of(WebhookCallMethod::Post), reqwest::Method::POST);
        assert_eq!(method_of(WebhookCallMethod::Delete), reqwest::Method::DELETE);
    }
}
