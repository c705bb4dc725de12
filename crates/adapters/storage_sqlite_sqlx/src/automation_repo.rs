//! `SQLite` implementation of [`AutomationRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use pageforge_app::ports::AutomationRepository;
use pageforge_domain::automation::{Action, Automation, Trigger};
use pageforge_domain::error::PageForgeError;
use pageforge_domain::id::AutomationId;
use pageforge_domain::time::Timestamp;

use crate::error::StorageError;

struct Wrapper(Automation);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Automation> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let description: Option<String> = row.try_get("description")?;
        let enabled: bool = row.try_get("enabled")?;
        let trigger_json: String = row.try_get("trigger_data")?;
        let actions_json: String = row.try_get("actions")?;
        let retry_on_failure: bool = row.try_get("retry_on_failure")?;
        let max_retries: u32 = row.try_get("max_retries")?;
        let log_executions: bool = row.try_get("log_executions")?;
        let last_triggered_str: Option<String> = row.try_get("last_triggered")?;

        let id = AutomationId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let trigger: Trigger = serde_json::from_str(&trigger_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let actions: Vec<Action> = serde_json::from_str(&actions_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_triggered = last_triggered_str
            .map(|s| {
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.to_utc())
                    .map_err(|err| sqlx::Error::Decode(Box::new(err)))
            })
            .transpose()?;

        Ok(Self(Automation {
            id,
            name,
            description,
            enabled,
            trigger,
            actions,
            retry_on_failure,
            max_retries,
            log_executions,
            last_triggered,
        }))
    }
}

/// `SQLite`-backed automation repository.
pub struct SqliteAutomationRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationRepository for SqliteAutomationRepository {
    async fn create(&self, automation: Automation) -> Result<Automation, PageForgeError> {
        let id = automation.id.to_string();
        let trigger_json =
            serde_json::to_string(&automation.trigger).map_err(StorageError::from)?;
        let actions_json =
            serde_json::to_string(&automation.actions).map_err(StorageError::from)?;
        let last_triggered = automation.last_triggered.map(|ts| ts.to_rfc3339());

        sqlx::query(
                "INSERT INTO automations (id, name, description, enabled, trigger_data, actions, retry_on_failure, max_retries, log_executions, last_triggered) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&automation.name)
            .bind(&automation.description)
            .bind(automation.enabled)
            .bind(&trigger_json)
            .bind(&actions_json)
            .bind(automation.retry_on_failure)
            .bind(automation.max_retries)
            .bind(automation.log_executions)
            .bind(&last_triggered)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(automation)
    }

    async fn get_by_id(&self, id: AutomationId) -> Result<Option<Automation>, PageForgeError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM automations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Automation>, PageForgeError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM automations ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_enabled(&self) -> Result<Vec<Automation>, PageForgeError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM automations WHERE enabled = 1 ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, automation: Automation) -> Result<Automation, PageForgeError> {
        let id = automation.id.to_string();
        let trigger_json =
            serde_json::to_string(&automation.trigger).map_err(StorageError::from)?;
        let actions_json =
            serde_json::to_string(&automation.actions).map_err(StorageError::from)?;
        let last_triggered = automation.last_triggered.map(|ts| ts.to_rfc3339());

        sqlx::query(
                "UPDATE automations SET name = ?, description = ?, enabled = ?, trigger_data = ?, actions = ?, retry_on_failure = ?, max_retries = ?, log_executions = ?, last_triggered = ? WHERE id = ?",
            )
            .bind(&automation.name)
            .bind(&automation.description)
            .bind(automation.enabled)
            .bind(&trigger_json)
            .bind(&actions_json)
            .bind(automation.retry_on_failure)
            .bind(automation.max_retries)
            .bind(automation.log_executions)
            .bind(&last_triggered)
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(automation)
    }

    async fn set_last_triggered(
        &self,
        id: AutomationId,
        at: Timestamp,
    ) -> Result<(), PageForgeError> {
        sqlx::query("UPDATE automations SET last_triggered = ? WHERE id = ?")
            .bind(at.to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn delete(&self, id: AutomationId) -> Result<(), PageForgeError> {
        sqlx::query("DELETE FROM automations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use pageforge_domain::automation::{
        Action, ActionKind, EmailConfig, Trigger, WebhookCallMethod, WebhookConfig,
    };
    use pageforge_domain::event::RecordEvent;

    async fn setup() -> SqliteAutomationRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteAutomationRepository::new(db.pool().clone())
    }

    fn email_action() -> Action {
        Action {
            name: None,
            skip_if: None,
            kind: ActionKind::SendEmail(EmailConfig {
                to: "ops@example.com".to_string(),
                subject: "Hello".to_string(),
                body: "World".to_string(),
                from: None,
                reply_to: None,
            }),
        }
    }

    fn valid_automation() -> Automation {
        Automation::builder()
            .name("Test rule")
            .trigger(Trigger::Manual)
            .action(email_action())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_automation() {
        let repo = setup().await;
        let auto = valid_automation();
        let id = auto.id;

        repo.create(auto).await.unwrap();
        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.name, "Test rule");
        assert!(fetched.enabled);
        assert!(fetched.log_executions);
    }

    #[tokio::test]
    async fn should_store_ids_as_hyphenated_text() {
        let repo = setup().await;
        let auto = valid_automation();
        let id = auto.id;
        repo.create(auto).await.unwrap();

        let (kind, stored): (String, String) =
            sqlx::query_as("SELECT typeof(id), id FROM automations")
                .fetch_one(&repo.pool)
                .await
                .unwrap();
        assert_eq!(kind, "text");
        assert_eq!(stored, id.to_string());
    }

    #[tokio::test]
    async fn should_return_none_when_automation_not_found() {
        let repo = setup().await;
        let result = repo.get_by_id(AutomationId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_list_all_automations() {
        let repo = setup().await;
        repo.create(valid_automation()).await.unwrap();
        let mut auto2 = valid_automation();
        auto2.name = "Second rule".to_string();
        repo.create(auto2).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn should_list_only_enabled_automations() {
        let repo = setup().await;
        repo.create(valid_automation()).await.unwrap();

        let mut disabled = valid_automation();
        disabled.name = "Disabled rule".to_string();
        disabled.enabled = false;
        repo.create(disabled).await.unwrap();

        let enabled = repo.get_enabled().await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert!(enabled[0].enabled);
    }

    #[tokio::test]
    async fn should_update_automation() {
        let repo = setup().await;
        let auto = valid_automation();
        let id = auto.id;
        repo.create(auto).await.unwrap();

        let mut fetched = repo.get_by_id(id).await.unwrap().unwrap();
        fetched.name = "Updated name".to_string();
        fetched.enabled = false;
        fetched.retry_on_failure = true;
        fetched.max_retries = 5;
        repo.update(fetched).await.unwrap();

        let updated = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Updated name");
        assert!(!updated.enabled);
        assert!(updated.retry_on_failure);
        assert_eq!(updated.max_retries, 5);
    }

    #[tokio::test]
    async fn should_record_last_triggered_timestamp() {
        let repo = setup().await;
        let auto = valid_automation();
        let id = auto.id;
        repo.create(auto).await.unwrap();

        let at = pageforge_domain::time::now();
        repo.set_last_triggered(id, at).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        let stored = fetched.last_triggered.unwrap();
        assert_eq!(stored.timestamp(), at.timestamp());
    }

    #[tokio::test]
    async fn should_delete_automation() {
        let repo = setup().await;
        let auto = valid_automation();
        let id = auto.id;
        repo.create(auto).await.unwrap();

        repo.delete(id).await.unwrap();
        let result = repo.get_by_id(id).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_preserve_trigger_and_actions_through_roundtrip() {
        let repo = setup().await;
        let auto = Automation::builder()
            .name("Complex rule")
            .description("Ping the warehouse on publish")
            .trigger(Trigger::RecordHook {
                collection: "pages".to_string(),
                event: RecordEvent::AfterUpdate,
            })
            .action(Action {
                name: Some("notify".to_string()),
                skip_if: None,
                kind: ActionKind::Webhook(WebhookConfig {
                    url: "https://example.com/hook".to_string(),
                    method: WebhookCallMethod::Post,
                    headers: vec![],
                    payload_template: None,
                }),
            })
            .action(email_action())
            .build()
            .unwrap();
        let id = auto.id;

        repo.create(auto).await.unwrap();
        let fetched = repo.get_by_id(id).await.unwrap().unwrap();

        assert!(matches!(
            fetched.trigger,
            Trigger::RecordHook { ref collection, .. } if collection == "pages"
        ));
        assert_eq!(fetched.actions.len(), 2);
        assert_eq!(fetched.description.as_deref(), Some("Ping the warehouse on publish"));
    }
}
