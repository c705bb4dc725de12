//! # pageforge-domain
//!
//! Pure domain model for the pageforge content platform core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Blocks** (tagged, style-annotated content units stored in a
//!   page's layout) and the **RenderNode** tree the renderer emits
//! - Define **Automations** (trigger → actions, with rule evaluation)
//! - Define **Events** (the trigger emission contract)
//! - Pure evaluation logic: dot-path lookup, placeholder templates,
//!   rich-text flattening, operator semantics, schedule matching
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod block;
pub mod event;
pub mod path;
pub mod render;
pub mod richtext;
pub mod template;
