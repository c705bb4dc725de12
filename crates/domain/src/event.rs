//! Event — an immutable record of something that happened.
//!
//! Events are the trigger emission contract: the hosting backend produces
//! them when records change, when automation webhooks are called, or when
//! an automation itself fires. The `data` payload is arbitrary JSON and is
//! addressed via dot-notation field paths in conditions and templates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{AutomationId, EventId};
use crate::time::{self, Timestamp};

/// Record lifecycle hook points a collection event can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordEvent {
    AfterCreate,
    AfterUpdate,
    AfterDelete,
    BeforeCreate,
    BeforeUpdate,
    BeforeDelete,
}

impl std::fmt::Display for RecordEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AfterCreate => "afterCreate",
            Self::AfterUpdate => "afterUpdate",
            Self::AfterDelete => "afterDelete",
            Self::BeforeCreate => "beforeCreate",
            Self::BeforeUpdate => "beforeUpdate",
            Self::BeforeDelete => "beforeDelete",
        };
        f.write_str(name)
    }
}

/// Where an event originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventSource {
    /// A record in a named collection passed a lifecycle hook.
    Record {
        collection: String,
        event: RecordEvent,
    },
    /// An inbound automation webhook endpoint was called.
    Webhook { path: String },
    /// A schedule tick occurred.
    Schedule,
    /// Someone triggered an automation by hand (API call).
    Manual,
    /// An automation finished matching and executed.
    AutomationFired { automation_id: AutomationId },
}

/// An immutable occurrence with a JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub source: EventSource,
    /// Payload addressed by dot paths, e.g. `data.formData.email`.
    pub data: Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(source: EventSource, data: Value) -> Self {
        Self {
            id: EventId::new(),
            source,
            data,
            timestamp: time::now(),
        }
    }
}
