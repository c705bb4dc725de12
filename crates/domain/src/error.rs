//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PageForgeError`] via `#[from]`. Adapters wrap their infrastructure
//! errors in [`PageForgeError::Storage`] / [`DispatchError`] rather than
//! leaking sqlx or HTTP client types into the domain.

/// Top-level error for domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum PageForgeError {
    /// A domain invariant was violated.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A requested record does not exist.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// A persistence operation failed. The boxed source is the adapter's
    /// own error type.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An outbound side effect (email, webhook call) failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The `name` field was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// The automation has no actions.
    #[error("automation must have at least one action")]
    NoActions,

    /// An identifier failed to parse.
    #[error("invalid identifier: {value}")]
    InvalidId {
        /// The offending input.
        value: String,
    },

    /// A cron expression could not be parsed.
    #[error("invalid cron expression: {expression} ({reason})")]
    InvalidCronExpression {
        /// The offending expression.
        expression: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A schedule configuration is incomplete or out of range.
    #[error("invalid schedule: {reason}")]
    InvalidSchedule {
        /// What is wrong with the configuration.
        reason: String,
    },
}

/// A lookup by identifier found nothing.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Entity kind, e.g. `"Automation"`.
    pub entity: &'static str,
    /// The identifier that was looked up.
    pub id: String,
}

/// Failure of an outbound side effect.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The collaborator refused the request.
    #[error("{kind} rejected: {message}")]
    Rejected {
        /// Which collaborator, e.g. `"webhook"` or `"mailer"`.
        kind: &'static str,
        /// Rejection detail (status code, response body excerpt).
        message: String,
    },

    /// Transport-level failure (connection, TLS, DNS).
    #[error("{kind} transport error: {message}")]
    Transport {
        /// Which collaborator.
        kind: &'static str,
        /// Underlying error detail.
        message: String,
    },

    /// The action did not finish within its time budget.
    #[error("action timed out after {seconds}s")]
    Timeout {
        /// Configured budget.
        seconds: u64,
    },
}
