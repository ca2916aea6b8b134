//! Output formatting for contentops.
//!
//! This module provides formatters for displaying rules, templates, generated
//! content and execution results in various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::ContentOpsError;
use crate::features::automation::{AutomationRule, ExecutionResult, TriggerProcessingResult};
use crate::features::content::{NewsletterCampaign, SocialPost};
use crate::features::templates::ContentTemplate;

pub use json::*;
pub use pretty::*;

/// Format rules based on output format
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_rules(rules: &[AutomationRule], format: OutputFormat) -> Result<String, ContentOpsError> {
    match format {
        OutputFormat::Pretty => Ok(format_rules_pretty(rules)),
        OutputFormat::Json => format_list_json(rules),
    }
}

/// Format a single rule based on output format
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_rule(rule: &AutomationRule, format: OutputFormat) -> Result<String, ContentOpsError> {
    match format {
        OutputFormat::Pretty => Ok(format_rule_pretty(rule)),
        OutputFormat::Json => to_json(rule),
    }
}

/// Format templates based on output format
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_templates(
    templates: &[ContentTemplate],
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match format {
        OutputFormat::Pretty => Ok(format_templates_pretty(templates)),
        OutputFormat::Json => format_list_json(templates),
    }
}

/// Format a single template based on output format
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_template(template: &ContentTemplate, format: OutputFormat) -> Result<String, ContentOpsError> {
    match format {
        OutputFormat::Pretty => Ok(format_template_pretty(template)),
        OutputFormat::Json => to_json(template),
    }
}

/// Format social posts based on output format
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_posts(posts: &[SocialPost], format: OutputFormat) -> Result<String, ContentOpsError> {
    match format {
        OutputFormat::Pretty => Ok(format_posts_pretty(posts)),
        OutputFormat::Json => format_list_json(posts),
    }
}

/// Format newsletter campaigns based on output format
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_campaigns(
    campaigns: &[NewsletterCampaign],
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match format {
        OutputFormat::Pretty => Ok(format_campaigns_pretty(campaigns)),
        OutputFormat::Json => format_list_json(campaigns),
    }
}

/// Format a rule execution based on output format
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_execution(result: &ExecutionResult, format: OutputFormat) -> Result<String, ContentOpsError> {
    match format {
        OutputFormat::Pretty => Ok(format_execution_pretty(result)),
        OutputFormat::Json => to_json(result),
    }
}

/// Format a trigger processing result based on output format
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_processing(
    result: &TriggerProcessingResult,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match format {
        OutputFormat::Pretty => Ok(format_processing_pretty(result)),
        OutputFormat::Json => to_json(result),
    }
}
