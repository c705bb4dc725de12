//! Automation service — use-cases for managing automations.

use pageforge_domain::automation::Automation;
use pageforge_domain::error::{NotFoundError, PageForgeError};
use pageforge_domain::id::AutomationId;

use crate::execution::ExecutionRecord;
use crate::ports::{AutomationRepository, ExecutionLog};

/// Application service for automation CRUD and execution history.
pub struct AutomationService<R, L> {
    repo: R,
    execution_log: L,
}

impl<R: AutomationRepository, L: ExecutionLog> AutomationService<R, L> {
    /// Create a new service backed by the given repository and log.
    pub fn new(repo: R, execution_log: L) -> Self {
        Self {
            repo,
            execution_log,
        }
    }

    /// Create a new automation after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PageForgeError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, automation), fields(automation_name = %automation.name))]
    pub async fn create_automation(
        &self,
        automation: Automation,
    ) -> Result<Automation, PageForgeError> {
        automation.validate()?;
        self.repo.create(automation).await
    }

    /// Look up an automation by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`PageForgeError::NotFound`] when no automation with `id`
    /// exists, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_automation(&self, id: AutomationId) -> Result<Automation, PageForgeError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Automation",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all automations.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_automations(&self) -> Result<Vec<Automation>, PageForgeError> {
        self.repo.get_all().await
    }

    /// Get all enabled automations.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_enabled(&self) -> Result<Vec<Automation>, PageForgeError> {
        self.repo.get_enabled().await
    }

    /// Update an existing automation.
    ///
    /// # Errors
    ///
    /// Returns [`PageForgeError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, automation))]
    pub async fn update_automation(
        &self,
        automation: Automation,
    ) -> Result<Automation, PageForgeError> {
        automation.validate()?;
        self.repo.update(automation).await
    }

    /// Delete an automation by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_automation(&self, id: AutomationId) -> Result<(), PageForgeError> {
        self.repo.delete(id).await
    }

    /// Most recent runs of one automation, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PageForgeError::NotFound`] when no automation with `id`
    /// exists, or a storage error from the log.
    #[tracing::instrument(skip(self))]
    pub async fn recent_executions(
        &self,
        id: AutomationId,
        limit: u32,
    ) -> Result<Vec<ExecutionRecord>, PageForgeError> {
        self.get_automation(id).await?;
        self.execution_log.recent_for(id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageforge_domain::automation::{Action, ActionKind, EmailConfig, Trigger};
    use pageforge_domain::error::ValidationError;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    struct InMemoryAutomationRepo {
        store: Mutex<HashMap<AutomationId, Automation>>,
    }

    impl Default for InMemoryAutomationRepo {
        fn default() -> Self {
            Self {
                store: Mutex::new(HashMap::new()),
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
            let result = store.get(&id).cloned();
            async { Ok(result) }
        }

        fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, PageForgeError>> + Send {
            let store = self.store.lock().unwrap();
            let result: Vec<Automation> = store.values().cloned().collect();
            async { Ok(result) }
        }

        fn get_enabled(
            &self,
        ) -> impl Future<Output = Result<Vec<Automation>, PageForgeError>> + Send {
            let store = self.store.lock().unwrap();
            let result: Vec<Automation> = store.values().filter(|a| a.enabled).cloned().collect();
            async { Ok(result) }
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

    fn make_service() -> AutomationService<InMemoryAutomationRepo, InMemoryExecutionLog> {
        AutomationService::new(
            InMemoryAutomationRepo::default(),
            InMemoryExecutionLog::default(),
        )
    }

    fn valid_automation() -> Automation {
        Automation::builder()
            .name("Test automation")
            .trigger(Trigger::Manual)
            .action(Action {
                name: None,
                skip_if: None,
                kind: ActionKind::SendEmail(EmailConfig {
                    to: "ops@example.com".to_string(),
                    subject: "ping".to_string(),
                    body: "pong".to_string(),
                    from: None,
                    reply_to: None,
                }),
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_automation_when_valid() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;

        let created = svc.create_automation(auto).await.unwrap();
        assert_eq!(created.id, id);

        let fetched = svc.get_automation(id).await.unwrap();
        assert_eq!(fetched.name, "Test automation");
    }

    #[tokio::test]
    async fn should_reject_create_when_name_is_empty() {
        let svc = make_service();
        let mut auto = valid_automation();
        auto.name = String::new();

        let result = svc.create_automation(auto).await;
        assert!(matches!(
            result,
            Err(PageForgeError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_automation_missing() {
        let svc = make_service();
        let result = svc.get_automation(AutomationId::new()).await;
        assert!(matches!(result, Err(PageForgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_list_all_automations() {
        let svc = make_service();
        svc.create_automation(valid_automation()).await.unwrap();
        let mut auto2 = valid_automation();
        auto2.name = "Second".to_string();
        svc.create_automation(auto2).await.unwrap();

        let all = svc.list_automations().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn should_list_only_enabled_automations() {
        let svc = make_service();
        svc.create_automation(valid_automation()).await.unwrap();

        let mut disabled = valid_automation();
        disabled.name = "Disabled".to_string();
        disabled.enabled = false;
        svc.create_automation(disabled).await.unwrap();

        let enabled = svc.list_enabled().await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert!(enabled[0].enabled);
    }

    #[tokio::test]
    async fn should_update_automation() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;
        svc.create_automation(auto).await.unwrap();

        let mut updated = svc.get_automation(id).await.unwrap();
        updated.name = "Updated name".to_string();
        let saved = svc.update_automation(updated).await.unwrap();
        assert_eq!(saved.name, "Updated name");
    }

    #[tokio::test]
    async fn should_delete_automation() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;
        svc.create_automation(auto).await.unwrap();

        svc.delete_automation(id).await.unwrap();

        let result = svc.get_automation(id).await;
        assert!(matches!(result, Err(PageForgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_execution_history_for_unknown_automation() {
        let svc = make_service();
        let result = svc.recent_executions(AutomationId::new(), 10).await;
        assert!(matches!(result, Err(PageForgeError::NotFound(_))));
    }
}
