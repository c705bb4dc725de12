//! # pageforge-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **REST JSON API** for programmatic access
//!   (`/api/automations`, `/api/render`, `/api/webhooks/automations/…`)
//! - Map HTTP requests into application service and engine calls
//!   (driving adapter)
//! - Map application results into HTTP responses
//! - Enforce webhook method and shared-secret checks at the edge
//!
//! ## Dependency rule
//! Depends on `pageforge-app` (for port traits, services and the engine) and
//! `pageforge-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
