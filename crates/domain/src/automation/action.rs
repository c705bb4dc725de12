//! Action — one step executed when an automation fires.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rule::Rule;
use crate::path;

/// Comparison used by a skip condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipOperator {
    Equals,
    NotEquals,
    IsEmpty,
    IsNotEmpty,
}

/// Pre-execution guard on an action. When the condition holds against the
/// event payload, the action is skipped without counting as a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipIf {
    #[serde(default)]
    pub enabled: bool,
    pub field: String,
    pub operator: SkipOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SkipIf {
    /// Whether the action should be skipped for this payload.
    #[must_use]
    pub fn should_skip(&self, data: &Value) -> bool {
        if !self.enabled {
            return false;
        }
        let found = path::lookup(data, &self.field);
        match self.operator {
            SkipOperator::Equals => found.is_some_and(|v| {
                self.value.as_deref() == Some(path::value_to_string(v).as_str())
            }),
            SkipOperator::NotEquals => !found.is_some_and(|v| {
                self.value.as_deref() == Some(path::value_to_string(v).as_str())
            }),
            SkipOperator::IsEmpty => match found {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(Value::Array(a)) => a.is_empty(),
                Some(_) => false,
            },
            SkipOperator::IsNotEmpty => match found {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Array(a)) => !a.is_empty(),
                Some(_) => true,
            },
        }
    }
}

/// Outbound email payload. Recipient, subject, body and reply-to are
/// templates resolved against the event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Outbound webhook call. The URL, header values and payload template are
/// templates resolved against the event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default)]
    pub method: WebhookCallMethod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<WebhookHeader>,
    /// Request body template. When absent, the event payload is forwarded
    /// as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_template: Option<String>,
}

/// HTTP method for an outbound webhook call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebhookCallMethod {
    #[default]
    Post,
    Put,
    Patch,
    Get,
    Delete,
}

impl std::fmt::Display for WebhookCallMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Get => "GET",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Key/value header pair on an outbound webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookHeader {
    pub key: String,
    pub value: String,
}

/// What a single action does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    SendEmail(EmailConfig),
    Webhook(WebhookConfig),
    /// Evaluate a list of rules against the payload, accumulating facts.
    RulesEngine { rules: Vec<Rule> },
}

impl ActionKind {
    /// Short label used in logs and execution records.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SendEmail(_) => "send_email",
            Self::Webhook(_) => "webhook",
            Self::RulesEngine { .. } => "rules_engine",
        }
    }
}

/// One executable step of an automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_if: Option<SkipIf>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    /// Display name of this action, falling back to its kind label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind.label())
    }
}
