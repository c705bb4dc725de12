//! # pageforge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationRepository` — CRUD for automations
//!   - `ExecutionLog` — append & query automation execution records
//!   - `Mailer` — deliver outbound email
//!   - `WebhookDispatcher` — perform outbound HTTP calls
//! - Define **driving/inbound ports** as use-case structs:
//!   - `AutomationService` — create, update, list, get, delete
//!   - `AutomationEngine` — match triggers, run actions with retry policy
//!   - `block_renderer` — map block layouts to render trees
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `pageforge-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod automation_engine;
pub mod block_renderer;
pub mod event_bus;
pub mod execution;
pub mod ports;
pub mod services;
