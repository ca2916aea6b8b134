//! Configuration commands.

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::ContentOpsError;
use crate::output::to_json;

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized or written.
pub fn config(
    paths: &Paths,
    config: &Config,
    cmd: ConfigCommands,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match cmd {
        ConfigCommands::Show => match format {
            OutputFormat::Json => to_json(config),
            OutputFormat::Pretty => Ok(format!(
                "# {}\n# database: {}\n{}",
                paths.config_file.display(),
                config.database_path(paths).display(),
                serde_yaml::to_string(config)?
            )),
        }
        ConfigCommands::Init { force } => {
            if paths.config_file.exists() && !force {
                return Err(ContentOpsError::Config(format!(
                    "Config file already exists at {} (use --force to overwrite)",
                    paths.config_file.display()
                )));
            }

            paths.ensure_dirs()?;
            Config::default().save_to_path(&paths.config_file)?;

            match format {
                OutputFormat::Json => to_json(&serde_json::json!({
                    "path": paths.config_file.display().to_string(),
                })),
                OutputFormat::Pretty => Ok(format!(
                    "Wrote default configuration to {}",
                    paths.config_file.display()
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::with_root(dir.path().join("home"));
        let defaults = Config::default();

        let output = config(&paths, &defaults, ConfigCommands::Init { force: false }, OutputFormat::Pretty).unwrap();
        assert!(output.starts_with("Wrote default configuration"));
        assert!(paths.config_file.exists());

        let again = config(&paths, &defaults, ConfigCommands::Init { force: false }, OutputFormat::Pretty);
        assert!(again.is_err());

        config(&paths, &defaults, ConfigCommands::Init { force: true }, OutputFormat::Pretty).unwrap();
    }

    #[test]
    fn test_show_json() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::with_root(dir.path().to_path_buf());
        let output = config(&paths, &Config::default(), ConfigCommands::Show, OutputFormat::Json).unwrap();

        assert!(output.contains("\"scheduler_interval_minutes\": 60"));
        assert!(output.contains("\"default_platform\": \"linkedin\""));
    }
}
