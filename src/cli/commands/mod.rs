//! Command implementations for contentops.
//!
//! This module contains the implementation of all CLI commands.

mod config;
mod content;
mod rules;
mod scheduler;
mod templates;
mod trigger;

pub use config::config;
pub use content::{newsletters, posts};
pub use rules::rules;
pub use scheduler::scheduler;
pub use templates::templates;
pub use trigger::trigger;

use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::Shell;
use serde::de::DeserializeOwned;

use crate::cli::args::Cli;
use crate::config::{AutomationConfig, Config, Paths};
use crate::error::ContentOpsError;
use crate::features::automation::{ActionExecutor, AutomationEngine, RuleExecutor, RuleStorage};
use crate::features::content::{NewsletterStorage, SocialPostStorage};
use crate::features::templates::TemplateStorage;
use crate::storage::Database;

/// Storages and the engine wired over one database.
pub struct Services {
    /// Automation rules
    pub rules: Arc<RuleStorage>,
    /// Content templates
    pub templates: Arc<TemplateStorage>,
    /// Generated social posts
    pub posts: Arc<SocialPostStorage>,
    /// Generated newsletter campaigns
    pub newsletters: Arc<NewsletterStorage>,
    /// Automation engine over the storages above
    pub engine: Arc<AutomationEngine>,
}

impl Services {
    /// Open the configured database and wire everything to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open(paths: &Paths, config: &Config) -> Result<Self, ContentOpsError> {
        paths.ensure_dirs()?;
        let db = Database::open_at(&config.database_path(paths))?;
        Ok(Self::with_database(Arc::new(db), &config.automation))
    }

    /// Wire storages and the engine over an open database.
    #[must_use]
    pub fn with_database(db: Arc<Database>, settings: &AutomationConfig) -> Self {
        let rules = Arc::new(
            RuleStorage::new(Arc::clone(&db)).with_max_actions(settings.max_actions_per_rule),
        );
        let templates = Arc::new(TemplateStorage::new(Arc::clone(&db)));
        let posts = Arc::new(SocialPostStorage::new(Arc::clone(&db)));
        let newsletters = Arc::new(NewsletterStorage::new(db));

        let actions = ActionExecutor::new(templates.clone(), posts.clone(), newsletters.clone())
            .with_default_platform(settings.default_platform);
        let executor = RuleExecutor::new(actions).with_max_actions(settings.max_actions_per_rule);
        let engine = Arc::new(AutomationEngine::new(rules.clone(), executor));

        Self {
            rules,
            templates,
            posts,
            newsletters,
            engine,
        }
    }
}

/// Read a YAML (or JSON) file into `T`.
///
/// # Errors
///
/// Returns `ContentOpsError::Config` if the file cannot be read or parsed.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ContentOpsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ContentOpsError::Config(format!("Failed to read {}: {e}", path.display()))
    })?;

    serde_yaml::from_str(&contents).map_err(|e| {
        ContentOpsError::Config(format!("Failed to parse {}: {e}", path.display()))
    })
}

/// Generate a completion script for `shell`.
///
/// # Errors
///
/// Returns an error if the generated script is not valid UTF-8.
pub fn completions(shell: Shell) -> Result<String, ContentOpsError> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "contentops", &mut buf);
    String::from_utf8(buf)
        .map_err(|e| ContentOpsError::NotSupported(format!("Completion script is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automation::BlogPublishedTrigger;
    use tempfile::TempDir;

    #[test]
    fn test_read_yaml_accepts_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post.json");
        std::fs::write(&path, r#"{"title": "Hello", "url": "https://example.com/hello"}"#).unwrap();

        let blog: BlogPublishedTrigger = read_yaml(&path).unwrap();
        assert_eq!(blog.title, "Hello");
        assert!(blog.categories.is_empty());
    }

    #[test]
    fn test_read_yaml_missing_file() {
        let err = read_yaml::<BlogPublishedTrigger>(Path::new("/nonexistent/post.yaml")).unwrap_err();
        assert!(matches!(err, ContentOpsError::Config(_)));
    }

    #[test]
    fn test_completions_bash() {
        let script = completions(Shell::Bash).unwrap();
        assert!(script.contains("contentops"));
    }

    #[tokio::test]
    async fn test_services_share_database() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let services = Services::with_database(db, &AutomationConfig::default());

        assert_eq!(services.templates.seed_defaults().unwrap(), 3);
        assert!(services.rules.list().unwrap().is_empty());
        assert!(!services.engine.is_executing("anything"));
    }
}
