//! Storage for automation rules.
//!
//! Rules live in the `automation_rules` table. The trigger and the action
//! list are stored as JSON columns; `trigger_type` is duplicated into its
//! own column so active rules can be looked up by trigger.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::executor::DEFAULT_MAX_ACTIONS;
use super::rule::{AutomationRule, RuleType, TriggerType};
use crate::core::RuleRepository;
use crate::error::ContentOpsError;
use crate::storage::{column_error, parse_timestamp, run_blocking, Database};

const COLUMNS: &str = "id, name, description, rule_type, trigger_json, actions_json, is_active, \
                       priority, execution_count, last_executed, created_at, updated_at";

/// Storage for automation rules.
#[derive(Clone)]
pub struct RuleStorage {
    db: Arc<Database>,
    max_actions: usize,
}

impl RuleStorage {
    /// Create rule storage on a shared database.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            max_actions: DEFAULT_MAX_ACTIONS,
        }
    }

    /// Reject rules with more than `max_actions` actions on save.
    #[must_use]
    pub const fn with_max_actions(mut self, max_actions: usize) -> Self {
        self.max_actions = max_actions;
        self
    }

    /// Insert or update a rule.
    ///
    /// Updating keeps the stored execution bookkeeping and creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is invalid, has too many actions, or
    /// cannot be written.
    pub fn save(&self, rule: &AutomationRule) -> Result<(), ContentOpsError> {
        rule.validate()?;
        rule.check_action_limit(self.max_actions)?;

        let trigger = serde_json::to_string(&rule.trigger)?;
        let actions = serde_json::to_string(&rule.actions)?;
        let conn = self.db.connection()?;

        conn.execute(
            r"INSERT INTO automation_rules
              (id, name, description, rule_type, trigger_type, trigger_json, actions_json,
               is_active, priority, execution_count, last_executed, created_at, updated_at)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
              ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                rule_type = excluded.rule_type,
                trigger_type = excluded.trigger_type,
                trigger_json = excluded.trigger_json,
                actions_json = excluded.actions_json,
                is_active = excluded.is_active,
                priority = excluded.priority,
                updated_at = excluded.updated_at",
            params![
                rule.id,
                rule.name,
                rule.description,
                rule.rule_type.as_str(),
                rule.trigger_type().as_str(),
                trigger,
                actions,
                rule.is_active,
                rule.priority,
                rule.execution_count,
                rule.last_executed.map(|t| t.to_rfc3339()),
                rule.created_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| ContentOpsError::Database(format!("Failed to save rule: {e}")))?;

        Ok(())
    }

    /// Load a rule by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load(&self, id: &str) -> Result<Option<AutomationRule>, ContentOpsError> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT {COLUMNS} FROM automation_rules WHERE id = ?1");

        conn.query_row(&sql, [id], row_to_rule)
            .optional()
            .map_err(|e| ContentOpsError::Database(format!("Failed to query rule: {e}")))
    }

    /// List all rules by priority, then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self) -> Result<Vec<AutomationRule>, ContentOpsError> {
        let sql = format!("SELECT {COLUMNS} FROM automation_rules ORDER BY priority, name");
        self.query(&sql, [])
    }

    /// Active rules with a trigger type, by priority then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active(&self, trigger_type: TriggerType) -> Result<Vec<AutomationRule>, ContentOpsError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM automation_rules
             WHERE trigger_type = ?1 AND is_active = 1
             ORDER BY priority, name"
        );
        self.query(&sql, [trigger_type.as_str()])
    }

    /// Enable or disable a rule. Returns false if the rule does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_active(&self, id: &str, is_active: bool) -> Result<bool, ContentOpsError> {
        let conn = self.db.connection()?;
        let rows = conn
            .execute(
                "UPDATE automation_rules SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
                params![is_active, Utc::now().to_rfc3339(), id],
            )
            .map_err(|e| ContentOpsError::Database(format!("Failed to update rule: {e}")))?;

        Ok(rows > 0)
    }

    /// Delete a rule. Returns false if the rule does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, id: &str) -> Result<bool, ContentOpsError> {
        let conn = self.db.connection()?;
        let rows = conn
            .execute("DELETE FROM automation_rules WHERE id = ?1", [id])
            .map_err(|e| ContentOpsError::Database(format!("Failed to delete rule: {e}")))?;

        Ok(rows > 0)
    }

    /// Increment `execution_count` and set `last_executed` to now.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the rule does not exist.
    pub fn record_execution(&self, id: &str) -> Result<(), ContentOpsError> {
        let conn = self.db.connection()?;
        let rows = conn
            .execute(
                r"UPDATE automation_rules
                  SET execution_count = execution_count + 1, last_executed = ?1
                  WHERE id = ?2",
                params![Utc::now().to_rfc3339(), id],
            )
            .map_err(|e| ContentOpsError::Database(format!("Failed to record execution: {e}")))?;

        if rows == 0 {
            return Err(ContentOpsError::NotFound(format!("rule {id}")));
        }
        Ok(())
    }

    /// Save every rule of a set. Returns the number of rules saved.
    ///
    /// # Errors
    ///
    /// Returns an error on the first rule that cannot be saved.
    pub fn import(&self, set: &RuleSet) -> Result<usize, ContentOpsError> {
        for rule in &set.rules {
            self.save(rule)?;
        }
        Ok(set.rules.len())
    }

    /// All stored rules as a set.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded.
    pub fn export(&self) -> Result<RuleSet, ContentOpsError> {
        Ok(RuleSet { rules: self.list()? })
    }

    fn query<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<AutomationRule>, ContentOpsError> {
        let conn = self.db.connection()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ContentOpsError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(params, row_to_rule)
            .map_err(|e| ContentOpsError::Database(format!("Failed to query rules: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ContentOpsError::Database(e.to_string()))
    }
}

#[async_trait]
impl RuleRepository for RuleStorage {
    async fn get_active_rules_by_trigger(
        &self,
        trigger_type: TriggerType,
    ) -> Result<Vec<AutomationRule>, ContentOpsError> {
        let storage = self.clone();
        run_blocking(move || storage.list_active(trigger_type)).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<AutomationRule>, ContentOpsError> {
        let (storage, id) = (self.clone(), id.to_string());
        run_blocking(move || storage.load(&id)).await
    }

    async fn update_execution(&self, id: &str) -> Result<(), ContentOpsError> {
        let (storage, id) = (self.clone(), id.to_string());
        run_blocking(move || storage.record_execution(&id)).await
    }
}

fn row_to_rule(row: &Row<'_>) -> Result<AutomationRule, rusqlite::Error> {
    let rule_type: String = row.get(3)?;
    let trigger: String = row.get(4)?;
    let actions: String = row.get(5)?;
    let last_executed: Option<String> = row.get(9)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;

    Ok(AutomationRule {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        rule_type: RuleType::parse(&rule_type).map_err(|e| column_error(3, e))?,
        trigger: serde_json::from_str(&trigger).map_err(|e| column_error(4, e))?,
        actions: serde_json::from_str(&actions).map_err(|e| column_error(5, e))?,
        is_active: row.get(6)?,
        priority: row.get(7)?,
        execution_count: row.get(8)?,
        last_executed: last_executed.map(|s| parse_timestamp(9, &s)).transpose()?,
        created_at: parse_timestamp(10, &created_at)?,
        updated_at: parse_timestamp(11, &updated_at)?,
    })
}

/// Rule set for YAML import and export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rules in this set
    pub rules: Vec<AutomationRule>,
}

impl RuleSet {
    /// Create an empty rule set.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule.
    pub fn add(&mut self, rule: AutomationRule) {
        self.rules.push(rule);
    }

    /// Export to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ContentOpsError> {
        serde_yaml::to_string(self)
            .map_err(|e| ContentOpsError::Config(format!("Failed to serialize rules: {e}")))
    }

    /// Import from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_yaml(yaml: &str) -> Result<Self, ContentOpsError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ContentOpsError::Config(format!("Failed to parse rules: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automation::action::AutomationAction;
    use crate::features::automation::rule::{TimeSchedule, Trigger};
    use chrono::Weekday;

    fn create_test_storage() -> RuleStorage {
        RuleStorage::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn rule(name: &str, trigger: Trigger) -> AutomationRule {
        AutomationRule::new(name, RuleType::ContentGeneration, trigger)
            .with_action(AutomationAction::social_post(None))
    }

    #[test]
    fn test_save_and_load() {
        let storage = create_test_storage();
        let rule = rule(
            "Weekly digest",
            Trigger::time_based(TimeSchedule::weekly(Weekday::Mon).at_hour(9)),
        )
        .with_description("Monday roundup")
        .with_action(AutomationAction::newsletter());

        storage.save(&rule).unwrap();

        let loaded = storage.load(&rule.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Weekly digest");
        assert_eq!(loaded.description.as_deref(), Some("Monday roundup"));
        assert_eq!(loaded.trigger, rule.trigger);
        assert_eq!(loaded.actions, rule.actions);
        assert!(storage.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_save_rejects_invalid_rule() {
        let storage = create_test_storage();
        let empty = AutomationRule::new("No actions", RuleType::Scheduling, Trigger::Manual);
        assert!(storage.save(&empty).is_err());
    }

    #[test]
    fn test_save_rejects_rule_over_action_limit() {
        let storage = create_test_storage().with_max_actions(2);
        let rule = rule("Busy", Trigger::Manual)
            .with_action(AutomationAction::UpdateAnalytics)
            .with_action(AutomationAction::UpdateAnalytics);

        let err = storage.save(&rule).unwrap_err();
        assert!(err.to_string().contains("3 actions exceed the limit of 2"));
        assert!(storage.load(&rule.id).unwrap().is_none());
    }

    #[test]
    fn test_list_rules() {
        let storage = create_test_storage();
        storage.save(&rule("Rule 1", Trigger::Manual).with_priority(10)).unwrap();
        storage.save(&rule("Rule 2", Trigger::Manual).with_priority(5)).unwrap();

        let rules = storage.list().unwrap();
        assert_eq!(rules.len(), 2);
        // Should be sorted by priority
        assert_eq!(rules[0].name, "Rule 2");
        assert_eq!(rules[1].name, "Rule 1");
    }

    #[test]
    fn test_list_active_by_trigger() {
        let storage = create_test_storage();
        let blog = rule("Blog", Trigger::blog_published());
        let off = rule("Off", Trigger::blog_published()).with_active(false);
        let manual = rule("Manual", Trigger::Manual);
        for r in [&blog, &off, &manual] {
            storage.save(r).unwrap();
        }

        let active = storage.list_active(TriggerType::BlogPublished).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, blog.id);

        assert!(storage.set_active(&off.id, true).unwrap());
        assert_eq!(storage.list_active(TriggerType::BlogPublished).unwrap().len(), 2);
        assert!(!storage.set_active("missing", true).unwrap());
    }

    #[tokio::test]
    async fn test_update_execution() {
        let storage = create_test_storage();
        let rule = rule("Counted", Trigger::Manual);
        storage.save(&rule).unwrap();

        storage.update_execution(&rule.id).await.unwrap();
        storage.update_execution(&rule.id).await.unwrap();

        let loaded = storage.get_by_id(&rule.id).await.unwrap().unwrap();
        assert_eq!(loaded.execution_count, 2);
        assert!(loaded.last_executed.is_some());

        assert!(storage.update_execution("missing").await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_repository_calls_from_concurrent_tasks() {
        let storage = Arc::new(create_test_storage());
        let rule = rule("Shared", Trigger::Manual);
        storage.save(&rule).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let id = rule.id.clone();
                tokio::spawn(async move { storage.update_execution(&id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let loaded = storage.get_by_id(&rule.id).await.unwrap().unwrap();
        assert_eq!(loaded.execution_count, 4);
    }

    #[test]
    fn test_save_keeps_bookkeeping() {
        let storage = create_test_storage();
        let mut rule = rule("Edited", Trigger::Manual);
        storage.save(&rule).unwrap();
        storage.record_execution(&rule.id).unwrap();

        rule.name = "Renamed".to_string();
        storage.save(&rule).unwrap();

        let loaded = storage.load(&rule.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Renamed");
        assert_eq!(loaded.execution_count, 1);
    }

    #[test]
    fn test_delete_rule() {
        let storage = create_test_storage();
        let rule = rule("To Delete", Trigger::Manual);
        storage.save(&rule).unwrap();

        assert!(storage.delete(&rule.id).unwrap());
        assert!(storage.load(&rule.id).unwrap().is_none());
        assert!(!storage.delete(&rule.id).unwrap());
    }

    #[test]
    fn test_rule_set_import_export() {
        let mut set = RuleSet::new();
        set.add(rule("Rule 1", Trigger::Manual));
        set.add(rule("Rule 2", Trigger::blog_published_in(vec!["Tech".to_string()])));

        let yaml = set.to_yaml().unwrap();
        assert!(yaml.contains("Rule 1"));
        assert!(yaml.contains("Rule 2"));

        let storage = create_test_storage();
        let parsed = RuleSet::from_yaml(&yaml).unwrap();
        assert_eq!(storage.import(&parsed).unwrap(), 2);
        assert_eq!(storage.export().unwrap().rules.len(), 2);
    }
}
