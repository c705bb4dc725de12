//! Trigger — the activation pattern of an automation.

use serde::{Deserialize, Serialize};

use super::schedule::Schedule;
use crate::event::{Event, EventSource, RecordEvent};

/// HTTP method a webhook trigger accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebhookMethod {
    #[default]
    Post,
    Get,
}

impl std::fmt::Display for WebhookMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => f.write_str("POST"),
            Self::Get => f.write_str("GET"),
        }
    }
}

/// Describes what should activate an automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires when a collection record passes through a lifecycle hook.
    RecordHook {
        collection: String,
        event: RecordEvent,
    },
    /// Fires on a time pattern, either a preset frequency or a raw cron
    /// expression.
    Schedule(Schedule),
    /// Fires when an inbound request hits the automation webhook path.
    Webhook {
        path: String,
        #[serde(default)]
        method: WebhookMethod,
        /// Shared secret the caller must present, when set.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secret: Option<String>,
    },
    /// Fires only when triggered manually via the API.
    Manual,
}

impl Trigger {
    /// Check whether this trigger matches a given event.
    ///
    /// `Schedule` and `Manual` triggers never match broadcast events;
    /// they are activated through other mechanisms.
    #[must_use]
    pub fn matches_event(&self, event: &Event) -> bool {
        match self {
            Self::RecordHook { collection, event: hook } => matches!(
                &event.source,
                EventSource::Record { collection: c, event: e }
                    if c == collection && e == hook
            ),
            Self::Webhook { path, .. } => matches!(
                &event.source,
                EventSource::Webhook { path: p } if p == path
            ),
            Self::Schedule(_) | Self::Manual => false,
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordHook { collection, event } => {
                write!(f, "record_hook({collection}/{event})")
            }
            Self::Schedule(schedule) => write!(f, "schedule({})", schedule.schedule_type),
            Self::Webhook { path, method, .. } => write!(f, "webhook({method} {path})"),
            Self::Manual => f.write_str("manual"),
        }
    }
}
