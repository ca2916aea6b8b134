//! Path resolution for contentops configuration and data files.
//!
//! All data lives under `$CONTENTOPS_HOME`, or `~/.contentops/` when unset:
//! - `config.yaml` - Main configuration file
//! - `contentops.db` - SQLite database for rules, templates and generated content
//! - `exports/` - Default destination for rule exports

use std::path::PathBuf;

use crate::error::ContentOpsError;

/// Environment variable overriding the data root.
pub const HOME_ENV: &str = "CONTENTOPS_HOME";

/// Paths to contentops configuration and data.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory
    pub root: PathBuf,
    /// Config file: `<root>/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `<root>/contentops.db`
    pub database: PathBuf,
    /// Exports directory: `<root>/exports/`
    pub exports: PathBuf,
}

impl Paths {
    /// Resolve paths from `$CONTENTOPS_HOME` or the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if neither location can be determined.
    pub fn new() -> Result<Self, ContentOpsError> {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            ContentOpsError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".contentops")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("contentops.db"),
            exports: root.join("exports"),
            root,
        }
    }

    /// Ensure all directories exist, creating them if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), ContentOpsError> {
        for dir in [&self.root, &self.exports] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    ContentOpsError::Config(format!(
                        "Failed to create directory {}: {e}",
                        dir.display()
                    ))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-contentops");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("contentops.db"));
        assert_eq!(paths.exports, root.join("exports"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested"));

        paths.ensure_dirs().unwrap();

        assert!(paths.root.exists());
        assert!(paths.exports.exists());
    }
}
