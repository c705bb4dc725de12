//! HTTP email relay implementation of [`Mailer`].
//!
//! Posts the resolved message as JSON to a relay endpoint (e.g. a
//! transactional email service or an internal SMTP bridge). Keeping SMTP
//! itself out of process keeps this adapter a thin HTTP client.

use pageforge_app::ports::{EmailMessage, Mailer};
use pageforge_domain::error::{DispatchError, PageForgeError};

/// Mailer that relays messages to an HTTP endpoint.
pub struct HttpRelayMailer {
    client: reqwest::Client,
    relay_url: String,
    api_key: Option<String>,
}

impl HttpRelayMailer {
    /// Create a mailer posting to the given relay URL.
    #[must_use]
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url: relay_url.into(),
            api_key: None,
        }
    }

    /// Attach a bearer token sent with each relay request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl Mailer for HttpRelayMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), PageForgeError> {
        let mut builder = self.client.post(&self.relay_url).json(&message);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| DispatchError::Transport {
                kind: "mailer",
                message: err.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %message.to, status = %status, "email relayed");
            Ok(())
        } else {
            Err(DispatchError::Rejected {
                kind: "mailer",
                message: status.to_string(),
            }
            .into())
        }
    }
}
