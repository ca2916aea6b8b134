//! Rule command implementation.
//!
//! Handles automation rule management commands.

use std::fs;
use std::path::Path;

use crate::cli::args::{OutputFormat, RulesCommands};
use crate::cli::commands::read_yaml;
use crate::error::ContentOpsError;
use crate::features::automation::{AutomationRule, RuleSet, RuleStorage};
use crate::output::{format_rule, format_rules, to_json};

/// Execute rule subcommands.
///
/// # Errors
///
/// Returns an error if a file cannot be read or the storage operation fails.
pub fn rules(
    storage: &RuleStorage,
    cmd: RulesCommands,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match cmd {
        RulesCommands::List => format_rules(&storage.list()?, format),
        RulesCommands::Show { id } => format_rule(&load_rule(storage, &id)?, format),
        RulesCommands::Add { file } => add_rule(storage, &file, format),
        RulesCommands::Toggle { id, enable, disable } => {
            toggle_rule(storage, &id, enable, disable, format)
        }
        RulesCommands::Delete { id, force } => delete_rule(storage, &id, force, format),
        RulesCommands::Import { file } => import_rules(storage, &file, format),
        RulesCommands::Export { file } => export_rules(storage, file.as_deref(), format),
    }
}

fn load_rule(storage: &RuleStorage, id: &str) -> Result<AutomationRule, ContentOpsError> {
    storage
        .load(id)?
        .ok_or_else(|| ContentOpsError::NotFound(format!("Rule: {id}")))
}

/// Add or replace a rule.
fn add_rule(storage: &RuleStorage, file: &Path, format: OutputFormat) -> Result<String, ContentOpsError> {
    let rule: AutomationRule = read_yaml(file)?;
    storage.save(&rule)?;
    let saved = load_rule(storage, &rule.id)?;

    match format {
        OutputFormat::Json => to_json(&saved),
        OutputFormat::Pretty => Ok(format!("Saved rule: {} (ID: {})", saved.name, saved.id)),
    }
}

/// Toggle a rule.
fn toggle_rule(
    storage: &RuleStorage,
    id: &str,
    enable: bool,
    disable: bool,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    let rule = load_rule(storage, id)?;

    let is_active = if enable {
        true
    } else if disable {
        false
    } else {
        !rule.is_active
    };

    storage.set_active(id, is_active)?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "id": id,
            "name": rule.name,
            "is_active": is_active,
        })),
        OutputFormat::Pretty => Ok(format!(
            "Rule '{}' {}",
            rule.name,
            if is_active { "activated" } else { "deactivated" }
        )),
    }
}

/// Delete a rule.
fn delete_rule(
    storage: &RuleStorage,
    id: &str,
    force: bool,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    if !force {
        return Err(ContentOpsError::Config("Use --force to delete rule".to_string()));
    }

    if storage.delete(id)? {
        match format {
            OutputFormat::Json => to_json(&serde_json::json!({"deleted": id})),
            OutputFormat::Pretty => Ok(format!("Deleted rule: {id}")),
        }
    } else {
        Err(ContentOpsError::NotFound(format!("Rule: {id}")))
    }
}

/// Import a rule set.
fn import_rules(storage: &RuleStorage, file: &Path, format: OutputFormat) -> Result<String, ContentOpsError> {
    let yaml = fs::read_to_string(file).map_err(|e| {
        ContentOpsError::Config(format!("Failed to read {}: {e}", file.display()))
    })?;
    let set = RuleSet::from_yaml(&yaml)?;
    let imported = storage.import(&set)?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({"imported": imported})),
        OutputFormat::Pretty => Ok(format!("Imported {imported} rules")),
    }
}

/// Export all rules.
fn export_rules(
    storage: &RuleStorage,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    let set = storage.export()?;

    let Some(path) = file else {
        return match format {
            OutputFormat::Json => to_json(&set),
            OutputFormat::Pretty => set.to_yaml(),
        };
    };

    fs::write(path, set.to_yaml()?).map_err(|e| {
        ContentOpsError::Config(format!("Failed to write {}: {e}", path.display()))
    })?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "exported": set.rules.len(),
            "path": path.display().to_string(),
        })),
        OutputFormat::Pretty => Ok(format!("Exported {} rules to {}", set.rules.len(), path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automation::{AutomationAction, RuleType, Trigger};
    use crate::storage::Database;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn storage() -> RuleStorage {
        RuleStorage::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn make_rule(id: &str) -> AutomationRule {
        AutomationRule::new("Blog to LinkedIn", RuleType::ContentGeneration, Trigger::blog_published())
            .with_id(id)
            .with_action(AutomationAction::social_post(None))
    }

    #[test]
    fn test_add_rule_from_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rule.yaml");
        fs::write(
            &path,
            r"
id: blog-linkedin
name: Blog to LinkedIn
rule_type: content_generation
trigger:
  trigger_type: blog_published
  trigger_conditions:
    blog_categories: [ai]
actions:
  - type: generate_social_post
    platform: linkedin
",
        )
        .unwrap();

        let storage = storage();
        let output = rules(&storage, RulesCommands::Add { file: path }, OutputFormat::Pretty).unwrap();

        assert!(output.contains("Saved rule: Blog to LinkedIn (ID: blog-linkedin)"));
        assert!(storage.load("blog-linkedin").unwrap().is_some());
    }

    #[test]
    fn test_toggle_flips_state() {
        let storage = storage();
        storage.save(&make_rule("r1")).unwrap();

        let cmd = RulesCommands::Toggle {
            id: "r1".to_string(),
            enable: false,
            disable: false,
        };
        let output = rules(&storage, cmd, OutputFormat::Pretty).unwrap();

        assert!(output.contains("deactivated"));
        assert!(!storage.load("r1").unwrap().unwrap().is_active);
    }

    #[test]
    fn test_delete_requires_force() {
        let storage = storage();
        storage.save(&make_rule("r1")).unwrap();

        let cmd = RulesCommands::Delete {
            id: "r1".to_string(),
            force: false,
        };
        assert!(rules(&storage, cmd, OutputFormat::Pretty).is_err());
        assert!(storage.load("r1").unwrap().is_some());
    }

    #[test]
    fn test_delete_missing_rule() {
        let cmd = RulesCommands::Delete {
            id: "missing".to_string(),
            force: true,
        };
        let err = rules(&storage(), cmd, OutputFormat::Pretty).unwrap_err();
        assert!(matches!(err, ContentOpsError::NotFound(_)));
    }

    #[test]
    fn test_export_then_import() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.yaml");

        let source = storage();
        source.save(&make_rule("r1")).unwrap();
        source.save(&make_rule("r2")).unwrap();
        let output = rules(
            &source,
            RulesCommands::Export { file: Some(path.clone()) },
            OutputFormat::Pretty,
        )
        .unwrap();
        assert!(output.contains("Exported 2 rules"));

        let target = storage();
        let output = rules(&target, RulesCommands::Import { file: path }, OutputFormat::Json).unwrap();
        assert!(output.contains("\"imported\": 2"));
        assert_eq!(target.list().unwrap().len(), 2);
    }
}
