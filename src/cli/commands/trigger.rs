//! Trigger command implementation.
//!
//! Feeds trigger payloads to the automation engine and reports the outcome.

use chrono::DateTime;

use crate::cli::args::{OutputFormat, TriggerCommands};
use crate::cli::commands::read_yaml;
use crate::error::ContentOpsError;
use crate::features::automation::{AutomationEngine, BlogPublishedTrigger, ManualTrigger};
use crate::output::{format_execution, format_processing};

/// Execute trigger subcommands.
///
/// Rule failures are part of the reported result; only unreadable input is
/// an error.
///
/// # Errors
///
/// Returns an error if a payload file cannot be read or parsed.
pub async fn trigger(
    engine: &AutomationEngine,
    cmd: TriggerCommands,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match cmd {
        TriggerCommands::Blog { file } => {
            let blog: BlogPublishedTrigger = read_yaml(&file)?;
            let result = engine.process_blog_published_trigger(blog).await;
            format_processing(&result, format)
        }
        TriggerCommands::Manual {
            rule_id,
            payload,
            requested_by,
        } => {
            let mut manual = match payload {
                Some(path) => read_yaml::<ManualTrigger>(&path)?,
                None => ManualTrigger::default(),
            };
            if requested_by.is_some() {
                manual.requested_by = requested_by;
            }
            let result = engine.process_manual_trigger(&rule_id, manual).await;
            format_execution(&result, format)
        }
        TriggerCommands::Tick { at } => {
            let result = match at {
                Some(at) => {
                    let now = DateTime::parse_from_rfc3339(&at)
                        .map_err(|e| ContentOpsError::Validation(format!("time '{at}': {e}")))?;
                    engine.process_time_based_triggers_at(now).await
                }
                None => engine.process_time_based_triggers().await,
            };
            format_processing(&result, format)
        }
    }
}
