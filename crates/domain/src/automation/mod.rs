//! Automation — trigger → actions rules with retry and logging policy.
//!
//! An automation names a [`Trigger`] that activates it and an ordered list
//! of [`Action`]s to execute. Actions run sequentially and independently;
//! a rules-engine action carries its own [`Rule`] set and fact scope.

mod action;
mod rule;
mod schedule;
mod trigger;

pub use action::{
    Action, ActionKind, EmailConfig, SkipIf, SkipOperator, WebhookCallMethod, WebhookConfig,
    WebhookHeader,
};
pub use rule::{Condition, Facts, Operator, Rule, RuleOutcome};
pub use schedule::{CronSchedule, Schedule, ScheduleType};
pub use trigger::{Trigger, WebhookMethod};

use serde::{Deserialize, Serialize};

use crate::error::{PageForgeError, ValidationError};
use crate::id::AutomationId;
use crate::time::Timestamp;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A rule that reacts to events by executing actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    pub id: AutomationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    /// Re-attempt failed actions up to `max_retries` extra times.
    pub retry_on_failure: bool,
    pub max_retries: u32,
    /// Persist an execution record for each run.
    pub log_executions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered: Option<Timestamp>,
}

impl Automation {
    /// Create a builder for constructing an [`Automation`].
    #[must_use]
    pub fn builder() -> AutomationBuilder {
        AutomationBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PageForgeError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    /// - a schedule trigger does not lower to a valid cron expression
    pub fn validate(&self) -> Result<(), PageForgeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        if let Trigger::Schedule(schedule) = &self.trigger {
            schedule.to_cron()?;
        }
        Ok(())
    }

    /// Total attempts an action gets, counting the initial one.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        if self.retry_on_failure {
            1 + self.max_retries
        } else {
            1
        }
    }
}

/// Step-by-step builder for [`Automation`].
#[derive(Debug, Default)]
pub struct AutomationBuilder {
    id: Option<AutomationId>,
    name: Option<String>,
    description: Option<String>,
    enabled: Option<bool>,
    trigger: Option<Trigger>,
    actions: Vec<Action>,
    retry_on_failure: Option<bool>,
    max_retries: Option<u32>,
    log_executions: Option<bool>,
    last_triggered: Option<Timestamp>,
}

impl AutomationBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn retry_on_failure(mut self, retry: bool) -> Self {
        self.retry_on_failure = Some(retry);
        self
    }

    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    #[must_use]
    pub fn log_executions(mut self, log: bool) -> Self {
        self.log_executions = Some(log);
        self
    }

    #[must_use]
    pub fn last_triggered(mut self, ts: Timestamp) -> Self {
        self.last_triggered = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`Automation`].
    ///
    /// # Errors
    ///
    /// Returns [`PageForgeError::Validation`] if required fields are missing
    /// or empty.
    pub fn build(self) -> Result<Automation, PageForgeError> {
        let automation = Automation {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            enabled: self.enabled.unwrap_or(true),
            trigger: self.trigger.unwrap_or(Trigger::Manual),
            actions: self.actions,
            retry_on_failure: self.retry_on_failure.unwrap_or(false),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            log_executions: self.log_executions.unwrap_or(true),
            last_triggered: self.last_triggered,
        };
        automation.validate()?;
        Ok(automation)
    }
}
