//! # pageforge-adapter-outbound-reqwest
//!
//! Outbound HTTP adapter using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the [`WebhookDispatcher`] port for webhook actions
//! - Implement the [`Mailer`] port against an HTTP email relay
//! - Map transport and status failures into [`DispatchError`]
//!
//! ## Dependency rule
//! Depends on `pageforge-app` (for port traits) and `pageforge-domain` (for
//! error types). The `app` and `domain` crates must never reference this
//! adapter.
//!
//! [`WebhookDispatcher`]: pageforge_app::ports::WebhookDispatcher
//! [`Mailer`]: pageforge_app::ports::Mailer
//! [`DispatchError`]: pageforge_domain::error::DispatchError

pub mod mailer;
pub mod webhook;

pub use mailer::HttpRelayMailer;
pub use webhook::ReqwestWebhookDispatcher;
