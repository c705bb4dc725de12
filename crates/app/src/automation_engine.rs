//! Automation engine — reacts to events by matching triggers and running
//! actions.
//!
//! The engine subscribes to the event bus and, for each incoming event,
//! checks all enabled automations. When a trigger matches, the actions run
//! sequentially with the automation's retry policy; one action failing does
//! not stop the ones after it, and one automation failing does not stop the
//! others. Schedule triggers are driven separately through [`process_tick`].
//!
//! [`process_tick`]: AutomationEngine::process_tick

use std::time::Duration;

use pageforge_domain::automation::{
    Action, ActionKind, Automation, Facts, Trigger, WebhookCallMethod, WebhookMethod,
};
use pageforge_domain::error::{DispatchError, NotFoundError, PageForgeError};
use pageforge_domain::event::{Event, EventSource};
use pageforge_domain::id::{AutomationId, ExecutionId};
use pageforge_domain::template;
use pageforge_domain::time;

use crate::execution::{ActionOutcome, ActionStatus, ExecutionRecord};
use crate::ports::{
    AutomationRepository, EmailMessage, EventPublisher, ExecutionLog, Mailer, WebhookDispatcher,
    WebhookRequest,
};

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Upper bound on a single delivery attempt (email or webhook).
    pub action_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_secs(30),
        }
    }
}

/// Reactive automation engine that subscribes to domain events.
pub struct AutomationEngine<AR, M, W, L, P> {
    automation_repo: AR,
    mailer: M,
    webhooks: W,
    execution_log: L,
    publisher: P,
    config: EngineConfig,
}

impl<AR, M, W, L, P> AutomationEngine<AR, M, W, L, P>
where
    AR: AutomationRepository,
    M: Mailer,
    W: WebhookDispatcher,
    L: ExecutionLog,
    P: EventPublisher,
{
    /// Create a new engine with default tuning.
    pub fn new(automation_repo: AR, mailer: M, webhooks: W, execution_log: L, publisher: P) -> Self {
        Self::with_config(
            automation_repo,
            mailer,
            webhooks,
            execution_log,
            publisher,
            EngineConfig::default(),
        )
    }

    /// Create a new engine with explicit tuning.
    pub fn with_config(
        automation_repo: AR,
        mailer: M,
        webhooks: W,
        execution_log: L,
        publisher: P,
        config: EngineConfig,
    ) -> Self {
        Self {
            automation_repo,
            mailer,
            webhooks,
            execution_log,
            publisher,
            config,
        }
    }

    /// Process a single event against all enabled automations.
    ///
    /// Returns the identifiers of the automations that fired. A failing
    /// automation is logged and does not prevent the others from running.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading the enabled automations fails.
    #[tracing::instrument(skip_all, fields(event_id = %event.id))]
    pub async fn process_event(&self, event: &Event) -> Result<Vec<AutomationId>, PageForgeError> {
        let automations = self.automation_repo.get_enabled().await?;
        let mut triggered = Vec::new();

        for automation in &automations {
            if !automation.trigger.matches_event(event) {
                continue;
            }
            match self.run_automation(automation, event).await {
                Ok(_) => triggered.push(automation.id),
                Err(error) => {
                    tracing::error!(
                        automation = %automation.name,
                        %error,
                        "automation run failed"
                    );
                }
            }
        }

        Ok(triggered)
    }

    /// Fire due schedule automations for the given minute.
    ///
    /// An automation already triggered within the same minute is skipped,
    /// so overlapping ticks do not double-fire.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading the enabled automations fails.
    #[tracing::instrument(skip(self))]
    pub async fn process_tick(
        &self,
        now: pageforge_domain::time::Timestamp,
    ) -> Result<Vec<AutomationId>, PageForgeError> {
        let automations = self.automation_repo.get_enabled().await?;
        let mut triggered = Vec::new();

        for automation in &automations {
            let Trigger::Schedule(config) = &automation.trigger else {
                continue;
            };
            let schedule = match config.to_cron() {
                Ok(schedule) => schedule,
                Err(error) => {
                    tracing::warn!(automation = %automation.name, %error, "skipping bad schedule");
                    continue;
                }
            };
            if !schedule.is_due(now) {
                continue;
            }
            if let Some(last) = automation.last_triggered {
                if same_minute(last, now) {
                    continue;
                }
            }

            let event = Event::new(EventSource::Schedule, serde_json::json!({}));
            match self.run_automation(automation, &event).await {
                Ok(_) => triggered.push(automation.id),
                Err(error) => {
                    tracing::error!(
                        automation = %automation.name,
                        %error,
                        "scheduled run failed"
                    );
                }
            }
        }

        Ok(triggered)
    }

    /// Handle an inbound automation webhook call.
    ///
    /// Method and secret are enforced per automation: an automation whose
    /// webhook trigger names a different method or a different secret does
    /// not fire. When the path is known but nothing passed the checks, the
    /// call is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PageForgeError::NotFound`] when no enabled automation
    /// listens on `path`, [`PageForgeError::Dispatch`] with a rejection when
    /// credentials or method do not match, or a storage error.
    #[tracing::instrument(skip(self, payload))]
    pub async fn process_webhook(
        &self,
        path: &str,
        method: WebhookMethod,
        secret: Option<&str>,
        payload: serde_json::Value,
    ) -> Result<Vec<AutomationId>, PageForgeError> {
        let automations = self.automation_repo.get_enabled().await?;
        let listeners: Vec<_> = automations
            .iter()
            .filter(|automation| {
                matches!(&automation.trigger, Trigger::Webhook { path: p, .. } if p == path)
            })
            .collect();
        if listeners.is_empty() {
            return Err(NotFoundError {
                entity: "Webhook",
                id: path.to_string(),
            }
            .into());
        }

        let mut triggered = Vec::new();
        for automation in listeners {
            let Trigger::Webhook {
                method: expected_method,
                secret: expected_secret,
                ..
            } = &automation.trigger
            else {
                continue;
            };
            if *expected_method != method {
                continue;
            }
            if expected_secret.is_some() && expected_secret.as_deref() != secret {
                tracing::warn!(automation = %automation.name, "webhook secret mismatch");
                continue;
            }

            let event = Event::new(
                EventSource::Webhook {
                    path: path.to_string(),
                },
                payload.clone(),
            );
            match self.run_automation(automation, &event).await {
                Ok(_) => triggered.push(automation.id),
                Err(error) => {
                    tracing::error!(
                        automation = %automation.name,
                        %error,
                        "webhook run failed"
                    );
                }
            }
        }

        if triggered.is_empty() {
            return Err(DispatchError::Rejected {
                kind: "webhook",
                message: "method or secret did not match any automation".to_string(),
            }
            .into());
        }
        Ok(triggered)
    }

    /// Run one automation by hand, regardless of its trigger type.
    ///
    /// Disabled automations can be run manually; this is the escape hatch
    /// for testing a rule before switching it on.
    ///
    /// # Errors
    ///
    /// Returns [`PageForgeError::NotFound`] when no automation has this id,
    /// or a storage error from loading or logging.
    #[tracing::instrument(skip(self, payload))]
    pub async fn run_manual(
        &self,
        id: AutomationId,
        payload: serde_json::Value,
    ) -> Result<ExecutionRecord, PageForgeError> {
        let automation = self
            .automation_repo
            .get_by_id(id)
            .await?
            .ok_or(NotFoundError {
                entity: "Automation",
                id: id.to_string(),
            })?;
        let event = Event::new(EventSource::Manual, payload);
        self.run_automation(&automation, &event).await
    }

    /// Execute one automation's actions against an event and record the run.
    async fn run_automation(
        &self,
        automation: &Automation,
        event: &Event,
    ) -> Result<ExecutionRecord, PageForgeError> {
        let started_at = time::now();
        let mut outcomes = Vec::with_capacity(automation.actions.len());

        for action in &automation.actions {
            outcomes.push(self.run_action(automation, action, event).await);
        }

        let record = ExecutionRecord {
            id: ExecutionId::new(),
            automation_id: automation.id,
            automation_name: automation.name.clone(),
            source: source_label(&event.source),
            status: ExecutionRecord::status_of(&outcomes),
            outcomes,
            started_at,
            finished_at: time::now(),
        };

        self.automation_repo
            .set_last_triggered(automation.id, started_at)
            .await?;

        let fired = Event::new(
            EventSource::AutomationFired {
                automation_id: automation.id,
            },
            serde_json::json!({
                "automationName": automation.name,
                "status": record.status,
            }),
        );
        if let Err(error) = self.publisher.publish(fired).await {
            tracing::warn!(%error, "failed to publish automation-fired event");
        }

        if automation.log_executions {
            self.execution_log.append(record.clone()).await?;
        }
        Ok(record)
    }

    /// Run one action with the automation's skip and retry policy.
    async fn run_action(
        &self,
        automation: &Automation,
        action: &Action,
        event: &Event,
    ) -> ActionOutcome {
        let name = action.display_name().to_string();

        if let Some(skip_if) = &action.skip_if {
            if skip_if.should_skip(&event.data) {
                tracing::debug!(action = %name, "skip condition held, skipping action");
                return ActionOutcome {
                    action: name,
                    status: ActionStatus::Skipped,
                    attempts: 0,
                    error: None,
                    facts: None,
                };
            }
        }

        let max_attempts = automation.max_attempts();
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < max_attempts {
            attempts += 1;
            match self.execute_kind(&action.kind, event).await {
                Ok(facts) => {
                    return ActionOutcome {
                        action: name,
                        status: ActionStatus::Succeeded,
                        attempts,
                        error: None,
                        facts,
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        automation = %automation.name,
                        action = %name,
                        attempt = attempts,
                        %error,
                        "action attempt failed"
                    );
                    last_error = Some(error.to_string());
                }
            }
        }

        ActionOutcome {
            action: name,
            status: ActionStatus::Failed,
            attempts,
            error: last_error,
            facts: None,
        }
    }

    /// Execute one action kind, resolving templates against the payload.
    async fn execute_kind(
        &self,
        kind: &ActionKind,
        event: &Event,
    ) -> Result<Option<Facts>, PageForgeError> {
        match kind {
            ActionKind::SendEmail(config) => {
                let message = EmailMessage {
                    to: template::resolve(&config.to, &event.data),
                    subject: template::resolve(&config.subject, &event.data),
                    body: template::resolve(&config.body, &event.data),
                    from: config
                        .from
                        .as_deref()
                        .map(|from| template::resolve(from, &event.data)),
                    reply_to: config
                        .reply_to
                        .as_deref()
                        .map(|reply_to| template::resolve(reply_to, &event.data)),
                };
                self.with_timeout(self.mailer.send(message)).await?;
                Ok(None)
            }
            ActionKind::Webhook(config) => {
                let body = match config.payload_template.as_deref() {
                    Some(payload_template) => {
                        let rendered = template::resolve(payload_template, &event.data);
                        match serde_json::from_str(&rendered) {
                            Ok(value) => value,
                            Err(error) => {
                                tracing::warn!(%error, "payload template is not JSON, sending as string");
                                serde_json::Value::String(rendered)
                            }
                        }
                    }
                    None => event.data.clone(),
                };
                let request = WebhookRequest {
                    url: template::resolve(&config.url, &event.data),
                    method: config.method,
                    headers: config
                        .headers
                        .iter()
                        .map(|header| {
                            (
                                header.key.clone(),
                                template::resolve(&header.value, &event.data),
                            )
                        })
                        .collect(),
                    // GET calls carry no body.
                    body: (config.method != WebhookCallMethod::Get).then_some(body),
                };
                self.with_timeout(self.webhooks.dispatch(request)).await?;
                Ok(None)
            }
            ActionKind::RulesEngine { rules } => {
                // Facts are scoped to this one action execution.
                let mut facts = Facts::new();
                for rule in rules {
                    let fired = rule.evaluate(&event.data, &mut facts);
                    tracing::debug!(rule = %rule.name, fired, "rule evaluated");
                }
                Ok(Some(facts))
            }
        }
    }

    async fn with_timeout(
        &self,
        fut: impl Future<Output = Result<(), PageForgeError>> + Send,
    ) -> Result<(), PageForgeError> {
        match tokio::time::timeout(self.config.action_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout {
                seconds: self.config.action_timeout.as_secs(),
            }
            .into()),
        }
    }
}

fn same_minute(a: pageforge_domain::time::Timestamp, b: pageforge_domain::time::Timestamp) -> bool {
    a.timestamp() / 60 == b.timestamp() / 60
}

fn source_label(source: &EventSource) -> String {
    match source {
        EventSource::Record { collection, event } => format!("record:{collection}/{event}"),
        EventSource::Webhook { path } => format!("webhook:{path}"),
        EventSource::Schedule => "schedule".to_string(),
        EventSource::Manual => "manual".to_string(),
        EventSource::AutomationFired { automation_id } => {
            format!("automation:{automation_id}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionStatus;
    use pageforge_domain::automation::{
        Condition, CronSchedule, EmailConfig, Operator, Rule, RuleOutcome, Schedule,
        ScheduleType, SkipIf, SkipOperator, WebhookConfig, WebhookHeader,
    };
    use pageforge_domain::event::RecordEvent;
    use serde_json::json;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    // ── In-memory automation repo ──────────────────────────────────

    struct InMemoryAutomationRepo {
        store: Mutex<HashMap<AutomationId, Automation>>,
    }

    impl InMemoryAutomationRepo {
        fn with(automations: Vec<Automation>) -> Self {
            let map: HashMap<_, _> = automations.into_iter().map(|a| (a.id, a)).collect();
            Self {
                store: Mutex::new(map),
            }
        }
    }

    impl AutomationRepository for InMemoryAutomationRepo {
        fn create(
            &self,
            automation: Automation,
        ) -> impl Future<Output = Result<Automation, PageForgeError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.insert(automation.id, automation.clone());
            async { Ok(automation) }
        }
        fn get_by_id(
            &self,
            id: AutomationId,
        ) -> impl Future<Output = Result<Option<Automation>, PageForgeError>> + Send {
            let store = self.store.lock().unwrap();
            let r = store.get(&id).cloned();
            async { Ok(r) }
        }
        fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, PageForgeError>> + Send {
            let store = self.store.lock().unwrap();
            let r: Vec<_> = store.values().cloned().collect();
            async { Ok(r) }
        }
        fn get_enabled(
            &self,
        ) -> impl Future<Output = Result<Vec<Automation>, PageForgeError>> + Send {
            let store = self.store.lock().unwrap();
            let r: Vec<_> = store.values().filter(|a| a.enabled).cloned().collect();
            async { Ok(r) }
        }
        fn update(
            &self,
            automation: Automation,
        ) -> impl Future<Output = Result<Automation, PageForgeError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.insert(automation.id, automation.clone());
            async { Ok(automation) }
        }
        fn set_last_triggered(
            &self,
            id: AutomationId,
            at: pageforge_domain::time::Timestamp,
        ) -> impl Future<Output = Result<(), PageForgeError>> + Send {
            let mut store = self.store.lock().unwrap();
            if let Some(automation) = store.get_mut(&id) {
                automation.last_triggered = Some(at);
            }
            async { Ok(()) }
        }
        fn delete(
            &self,
            id: AutomationId,
        ) -> impl Future<Output = Result<(), PageForgeError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.remove(&id);
            async { Ok(()) }
        }
    }

    // ── Spy mailer with programmable failures ──────────────────────

    #[derive(Default)]
    struct SpyMailer {
        sent: Mutex<Vec<EmailMessage>>,
        failures_remaining: Mutex<u32>,
    }

    impl SpyMailer {
        fn failing(times: u32) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failures_remaining: Mutex::new(times),
            }
        }
    }

    impl Mailer for SpyMailer {
        fn send(
            &self,
            message: EmailMessage,
        ) -> impl Future<Output = Result<(), PageForgeError>> + Send {
            let result = {
                let mut remaining = self.failures_remaining.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    Err(DispatchError::Transport {
                        kind: "smtp",
                        message: "connection refused".to_string(),
                    }
                    .into())
                } else {
                    self.sent.lock().unwrap().push(message);
                    Ok(())
                }
            };
            async { result }
        }
    }

    // ── Spy webhook dispatcher ─────────────────────────────────────

    #[derive(Default)]
    struct SpyDispatcher {
        requests: Mutex<Vec<WebhookRequest>>,
    }

    impl WebhookDispatcher for SpyDispatcher {
        fn dispatch(
            &self,
            request: WebhookRequest,
        ) -> impl Future<Output = Result<(), PageForgeError>> + Send {
            self.requests.lock().unwrap().push(request);
            async { Ok(()) }
        }
    }

    // ── In-memory execution log ────────────────────────────────────

    #[derive(Default)]
    struct InMemoryExecutionLog {
        records: Mutex<Vec<ExecutionRecord>>,
    }

    impl ExecutionLog for InMemoryExecutionLog {
        fn append(
            &self,
            record: ExecutionRecord,
        ) -> impl Future<Output = Result<(), PageForgeError>> + Send {
            self.records.lock().unwrap().push(record);
            async { Ok(()) }
        }
        fn recent(
            &self,
            limit: u32,
        ) -> impl Future<Output = Result<Vec<ExecutionRecord>, PageForgeError>> + Send {
            let records = self.records.lock().unwrap();
            let r: Vec<_> = records.iter().rev().take(limit as usize).cloned().collect();
            async { Ok(r) }
        }
        fn recent_for(
            &self,
            automation_id: AutomationId,
            limit: u32,
        ) -> impl Future<Output = Result<Vec<ExecutionRecord>, PageForgeError>> + Send {
            let records = self.records.lock().unwrap();
            let r: Vec<_> = records
                .iter()
                .rev()
                .filter(|record| record.automation_id == automation_id)
                .take(limit as usize)
                .cloned()
                .collect();
            async { Ok(r) }
        }
    }

    // ── Spy publisher ──────────────────────────────────────────────

    #[derive(Default)]
    struct SpyPublisher {
        events: Mutex<Vec<Event>>,
    }

    impl EventPublisher for SpyPublisher {
        fn publish(
            &self,
            event: Event,
        ) -> impl Future<Output = Result<(), PageForgeError>> + Send {
            self.events.lock().unwrap().push(event);
            async { Ok(()) }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    type TestEngine = AutomationEngine<
        InMemoryAutomationRepo,
        SpyMailer,
        SpyDispatcher,
        InMemoryExecutionLog,
        SpyPublisher,
    >;

    fn make_engine(automations: Vec<Automation>) -> TestEngine {
        AutomationEngine::new(
            InMemoryAutomationRepo::with(automations),
            SpyMailer::default(),
            SpyDispatcher::default(),
            InMemoryExecutionLog::default(),
            SpyPublisher::default(),
        )
    }

    fn email_action() -> Action {
        Action {
            name: Some("welcome mail".to_string()),
            skip_if: None,
            kind: ActionKind::SendEmail(EmailConfig {
                to: "{{data.email}}".to_string(),
                subject: "Welcome, {{data.name}}!".to_string(),
                body: "Hi {{data.name}}, thanks for signing up.".to_string(),
                from: None,
                reply_to: None,
            }),
        }
    }

    fn submission_trigger() -> Trigger {
        Trigger::RecordHook {
            collection: "form-submissions".to_string(),
            event: RecordEvent::AfterCreate,
        }
    }

    fn submission_event() -> Event {
        Event::new(
            EventSource::Record {
                collection: "form-submissions".to_string(),
                event: RecordEvent::AfterCreate,
            },
            json!({"data": {"email": "ada@example.com", "name": "Ada"}}),
        )
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_trigger_automation_when_event_matches() {
        let auto = Automation::builder()
            .name("Welcome mail")
            .trigger(submission_trigger())
            .action(email_action())
            .build()
            .unwrap();
        let engine = make_engine(vec![auto.clone()]);

        let triggered = engine.process_event(&submission_event()).await.unwrap();
        assert_eq!(triggered, vec![auto.id]);
    }

    #[tokio::test]
    async fn should_skip_disabled_automations() {
        let auto = Automation::builder()
            .name("Disabled rule")
            .enabled(false)
            .trigger(submission_trigger())
            .action(email_action())
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        let triggered = engine.process_event(&submission_event()).await.unwrap();
        assert!(triggered.is_empty());
    }

    #[tokio::test]
    async fn should_resolve_templates_into_the_sent_email() {
        let mut action = email_action();
        let ActionKind::SendEmail(ref mut config) = action.kind else {
            unreachable!();
        };
        config.reply_to = Some("{{data.email}}".to_string());
        let auto = Automation::builder()
            .name("Welcome mail")
            .trigger(submission_trigger())
            .action(action)
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();

        let sent = engine.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert_eq!(sent[0].subject, "Welcome, Ada!");
        assert_eq!(sent[0].body, "Hi Ada, thanks for signing up.");
        assert_eq!(sent[0].reply_to.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn should_resolve_missing_template_paths_to_empty() {
        let mut action = email_action();
        action.kind = ActionKind::SendEmail(EmailConfig {
            to: "ops@example.com".to_string(),
            subject: "Got: {{data.nope.missing}}".to_string(),
            body: String::new(),
            from: None,
            reply_to: None,
        });
        let auto = Automation::builder()
            .name("Missing path")
            .trigger(submission_trigger())
            .action(action)
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();

        let sent = engine.mailer.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Got: ");
    }

    #[tokio::test]
    async fn should_retry_until_success_and_count_attempts() {
        let auto = Automation::builder()
            .name("Retrying mail")
            .trigger(submission_trigger())
            .retry_on_failure(true)
            .max_retries(3)
            .action(email_action())
            .build()
            .unwrap();
        let engine = AutomationEngine::new(
            InMemoryAutomationRepo::with(vec![auto]),
            SpyMailer::failing(2),
            SpyDispatcher::default(),
            InMemoryExecutionLog::default(),
            SpyPublisher::default(),
        );

        engine.process_event(&submission_event()).await.unwrap();

        assert_eq!(engine.mailer.sent.lock().unwrap().len(), 1);
        let records = engine.execution_log.records.lock().unwrap();
        assert_eq!(records[0].outcomes[0].attempts, 3);
        assert_eq!(records[0].outcomes[0].status, ActionStatus::Succeeded);
    }

    #[tokio::test]
    async fn should_exhaust_retries_and_record_the_failure() {
        let auto = Automation::builder()
            .name("Doomed mail")
            .trigger(submission_trigger())
            .retry_on_failure(true)
            .max_retries(2)
            .action(email_action())
            .build()
            .unwrap();
        let engine = AutomationEngine::new(
            InMemoryAutomationRepo::with(vec![auto]),
            SpyMailer::failing(10),
            SpyDispatcher::default(),
            InMemoryExecutionLog::default(),
            SpyPublisher::default(),
        );

        let triggered = engine.process_event(&submission_event()).await.unwrap();
        // A failed run still counts as triggered; the record holds details.
        assert_eq!(triggered.len(), 1);

        let records = engine.execution_log.records.lock().unwrap();
        let outcome = &records[0].outcomes[0];
        assert_eq!(outcome.status, ActionStatus::Failed);
        assert_eq!(outcome.attempts, 3);
        assert!(outcome.error.as_deref().unwrap().contains("connection refused"));
        assert_eq!(records[0].status, ExecutionStatus::Failed);
    }

    #[tokio::test]
    async fn should_attempt_once_when_retry_is_disabled() {
        let auto = Automation::builder()
            .name("One shot")
            .trigger(submission_trigger())
            .action(email_action())
            .build()
            .unwrap();
        let engine = AutomationEngine::new(
            InMemoryAutomationRepo::with(vec![auto]),
            SpyMailer::failing(10),
            SpyDispatcher::default(),
            InMemoryExecutionLog::default(),
            SpyPublisher::default(),
        );

        engine.process_event(&submission_event()).await.unwrap();

        let records = engine.execution_log.records.lock().unwrap();
        assert_eq!(records[0].outcomes[0].attempts, 1);
    }

    #[tokio::test]
    async fn should_run_later_actions_after_an_earlier_failure() {
        let webhook_action = Action {
            name: Some("notify".to_string()),
            skip_if: None,
            kind: ActionKind::Webhook(WebhookConfig {
                url: "https://example.com/hook".to_string(),
                method: WebhookCallMethod::Post,
                headers: Vec::new(),
                payload_template: None,
            }),
        };
        let auto = Automation::builder()
            .name("Partial")
            .trigger(submission_trigger())
            .action(email_action())
            .action(webhook_action)
            .build()
            .unwrap();
        let engine = AutomationEngine::new(
            InMemoryAutomationRepo::with(vec![auto]),
            SpyMailer::failing(10),
            SpyDispatcher::default(),
            InMemoryExecutionLog::default(),
            SpyPublisher::default(),
        );

        engine.process_event(&submission_event()).await.unwrap();

        assert_eq!(engine.webhooks.requests.lock().unwrap().len(), 1);
        let records = engine.execution_log.records.lock().unwrap();
        assert_eq!(records[0].status, ExecutionStatus::Partial);
    }

    #[tokio::test]
    async fn should_skip_action_when_skip_condition_holds() {
        let mut action = email_action();
        action.skip_if = Some(SkipIf {
            enabled: true,
            field: "data.name".to_string(),
            operator: SkipOperator::Equals,
            value: Some("Ada".to_string()),
        });
        let auto = Automation::builder()
            .name("Skipping")
            .trigger(submission_trigger())
            .action(action)
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();

        assert!(engine.mailer.sent.lock().unwrap().is_empty());
        let records = engine.execution_log.records.lock().unwrap();
        assert_eq!(records[0].outcomes[0].status, ActionStatus::Skipped);
        assert_eq!(records[0].outcomes[0].attempts, 0);
        assert_eq!(records[0].status, ExecutionStatus::Succeeded);
    }

    #[tokio::test]
    async fn should_accumulate_facts_across_rules_in_one_action() {
        let rules_action = Action {
            name: Some("classify".to_string()),
            skip_if: None,
            kind: ActionKind::RulesEngine {
                rules: vec![
                    Rule {
                        name: "tier".to_string(),
                        conditions: vec![Condition {
                            field: "data.amount".to_string(),
                            operator: Operator::GreaterThanInclusive,
                            value: json!(1000),
                        }],
                        outcomes: vec![RuleOutcome::SetFact {
                            name: "tier".to_string(),
                            value: json!("gold"),
                        }],
                    },
                    Rule {
                        name: "escalate".to_string(),
                        conditions: vec![Condition {
                            field: "facts.tier".to_string(),
                            operator: Operator::Equal,
                            value: json!("gold"),
                        }],
                        outcomes: vec![RuleOutcome::SetFact {
                            name: "escalated".to_string(),
                            value: json!(true),
                        }],
                    },
                ],
            },
        };
        let auto = Automation::builder()
            .name("Rules")
            .trigger(submission_trigger())
            .action(rules_action)
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        let event = Event::new(
            EventSource::Record {
                collection: "form-submissions".to_string(),
                event: RecordEvent::AfterCreate,
            },
            json!({"data": {"amount": 2500}}),
        );
        engine.process_event(&event).await.unwrap();

        let records = engine.execution_log.records.lock().unwrap();
        let facts = records[0].outcomes[0].facts.as_ref().unwrap();
        assert_eq!(facts.get("tier"), Some(&json!("gold")));
        assert_eq!(facts.get("escalated"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn should_send_payload_and_resolved_headers_on_webhook_action() {
        let action = Action {
            name: None,
            skip_if: None,
            kind: ActionKind::Webhook(WebhookConfig {
                url: "https://example.com/{{data.name}}".to_string(),
                method: WebhookCallMethod::Put,
                headers: vec![WebhookHeader {
                    key: "X-User".to_string(),
                    value: "{{data.email}}".to_string(),
                }],
                payload_template: None,
            }),
        };
        let auto = Automation::builder()
            .name("Webhook")
            .trigger(submission_trigger())
            .action(action)
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();

        let requests = engine.webhooks.requests.lock().unwrap();
        assert_eq!(requests[0].url, "https://example.com/Ada");
        assert_eq!(requests[0].method, WebhookCallMethod::Put);
        assert_eq!(
            requests[0].headers,
            vec![("X-User".to_string(), "ada@example.com".to_string())]
        );
        assert!(requests[0].body.is_some());
    }

    #[tokio::test]
    async fn should_render_webhook_payload_template_as_json() {
        let action = Action {
            name: None,
            skip_if: None,
            kind: ActionKind::Webhook(WebhookConfig {
                url: "https://example.com/hook".to_string(),
                method: WebhookCallMethod::Post,
                headers: Vec::new(),
                payload_template: Some(
                    r#"{"user": "{{data.name}}", "mail": "{{data.email}}"}"#.to_string(),
                ),
            }),
        };
        let auto = Automation::builder()
            .name("Templated webhook")
            .trigger(submission_trigger())
            .action(action)
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();

        let requests = engine.webhooks.requests.lock().unwrap();
        assert_eq!(
            requests[0].body,
            Some(json!({"user": "Ada", "mail": "ada@example.com"}))
        );
    }

    #[tokio::test]
    async fn should_omit_body_on_get_webhook_action() {
        let action = Action {
            name: None,
            skip_if: None,
            kind: ActionKind::Webhook(WebhookConfig {
                url: "https://example.com/hook".to_string(),
                method: WebhookCallMethod::Get,
                headers: Vec::new(),
                payload_template: None,
            }),
        };
        let auto = Automation::builder()
            .name("Get webhook")
            .trigger(submission_trigger())
            .action(action)
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();

        let requests = engine.webhooks.requests.lock().unwrap();
        assert_eq!(requests[0].body, None);
    }

    #[tokio::test]
    async fn should_not_log_execution_when_logging_disabled() {
        let auto = Automation::builder()
            .name("Quiet")
            .trigger(submission_trigger())
            .log_executions(false)
            .action(email_action())
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();
        assert!(engine.execution_log.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_publish_automation_fired_event() {
        let auto = Automation::builder()
            .name("Publisher test")
            .trigger(submission_trigger())
            .action(email_action())
            .build()
            .unwrap();
        let auto_id = auto.id;
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();

        let published = engine.publisher.events.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].source,
            EventSource::AutomationFired {
                automation_id: auto_id
            }
        );
    }

    #[tokio::test]
    async fn should_fire_due_schedules_only_once_per_minute() {
        let auto = Automation::builder()
            .name("Nightly")
            .trigger(Trigger::Schedule(Schedule {
                schedule_type: ScheduleType::Custom,
                time: None,
                day_of_week: None,
                day_of_month: None,
                cron_expression: Some("* * * * *".to_string()),
            }))
            .action(email_action())
            .build()
            .unwrap();
        let engine = make_engine(vec![auto.clone()]);

        let now = time::now();
        let first = engine.process_tick(now).await.unwrap();
        assert_eq!(first, vec![auto.id]);

        // Same minute again: the dedup window holds.
        let second = engine.process_tick(now).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn should_not_fire_schedules_that_are_not_due() {
        let auto = Automation::builder()
            .name("Never now")
            .trigger(Trigger::Schedule(Schedule {
                schedule_type: ScheduleType::Custom,
                time: None,
                day_of_week: None,
                day_of_month: None,
                // 29th of February keeps this quiet almost always; the
                // assertion below recomputes due-ness to stay correct.
                cron_expression: Some("0 0 29 2 *".to_string()),
            }))
            .action(email_action())
            .build()
            .unwrap();
        let engine = make_engine(vec![auto]);

        let now = time::now();
        let due = CronSchedule::parse("0 0 29 2 *").unwrap().is_due(now);
        let triggered = engine.process_tick(now).await.unwrap();
        assert_eq!(!triggered.is_empty(), due);
    }

    #[tokio::test]
    async fn should_run_manual_even_when_disabled() {
        let auto = Automation::builder()
            .name("Manual test")
            .enabled(false)
            .action(email_action())
            .build()
            .unwrap();
        let auto_id = auto.id;
        let engine = make_engine(vec![auto]);

        let record = engine
            .run_manual(auto_id, json!({"data": {"email": "x@y.z", "name": "X"}}))
            .await
            .unwrap();
        assert_eq!(record.status, ExecutionStatus::Succeeded);
        assert_eq!(record.source, "manual");
        assert_eq!(engine.mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_return_not_found_for_manual_run_of_unknown_id() {
        let engine = make_engine(vec![]);
        let result = engine.run_manual(AutomationId::new(), json!({})).await;
        assert!(matches!(result, Err(PageForgeError::NotFound(_))));
    }

    fn webhook_automation(secret: Option<&str>) -> Automation {
        Automation::builder()
            .name("Deploy hook")
            .trigger(Trigger::Webhook {
                path: "deploy".to_string(),
                method: WebhookMethod::Post,
                secret: secret.map(ToString::to_string),
            })
            .action(email_action())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_fire_webhook_automation_with_matching_secret() {
        let auto = webhook_automation(Some("s3cret"));
        let auto_id = auto.id;
        let engine = make_engine(vec![auto]);

        let triggered = engine
            .process_webhook(
                "deploy",
                WebhookMethod::Post,
                Some("s3cret"),
                json!({"data": {"email": "a@b.c", "name": "A"}}),
            )
            .await
            .unwrap();
        assert_eq!(triggered, vec![auto_id]);
    }

    #[tokio::test]
    async fn should_reject_webhook_with_wrong_secret() {
        let engine = make_engine(vec![webhook_automation(Some("s3cret"))]);

        let result = engine
            .process_webhook("deploy", WebhookMethod::Post, Some("wrong"), json!({}))
            .await;
        assert!(matches!(result, Err(PageForgeError::Dispatch(_))));
        assert!(engine.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reject_webhook_with_wrong_method() {
        let engine = make_engine(vec![webhook_automation(None)]);

        let result = engine
            .process_webhook("deploy", WebhookMethod::Get, None, json!({}))
            .await;
        assert!(matches!(result, Err(PageForgeError::Dispatch(_))));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_webhook_path() {
        let engine = make_engine(vec![webhook_automation(None)]);

        let result = engine
            .process_webhook("unknown", WebhookMethod::Post, None, json!({}))
            .await;
        assert!(matches!(result, Err(PageForgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_update_last_triggered_after_a_run() {
        let auto = Automation::builder()
            .name("Stamped")
            .trigger(submission_trigger())
            .action(email_action())
            .build()
            .unwrap();
        let auto_id = auto.id;
        let engine = make_engine(vec![auto]);

        engine.process_event(&submission_event()).await.unwrap();

        let stored = engine
            .automation_repo
            .get_by_id(auto_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.last_triggered.is_some());
    }
}
