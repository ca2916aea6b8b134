//! Template CLI command implementation.
//!
//! This module implements the `contentops templates` command for managing
//! content templates.

use std::path::Path;

use crate::cli::args::{parse_vars, OutputFormat, TemplatesCommands};
use crate::cli::commands::read_yaml;
use crate::core::local_today;
use crate::error::ContentOpsError;
use crate::features::automation::{BlogPublishedTrigger, TriggerPayload};
use crate::features::templates::{
    build_template_context, render, ContentTemplate, RenderMode, TemplateContext, TemplateStorage,
};
use crate::output::{format_template, format_templates, to_json};

/// Execute the templates command.
///
/// # Errors
///
/// Returns an error if the template operation fails.
pub fn templates(
    storage: &TemplateStorage,
    cmd: TemplatesCommands,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match cmd {
        TemplatesCommands::List => format_templates(&storage.list()?, format),
        TemplatesCommands::Show { id } => format_template(&load_template(storage, &id)?, format),
        TemplatesCommands::Add { file } => add_template(storage, &file, format),
        TemplatesCommands::Preview { id, blog, vars } => {
            preview_template(storage, &id, blog.as_deref(), &vars, format)
        }
        TemplatesCommands::Delete { id, force } => delete_template(storage, &id, force, format),
        TemplatesCommands::Seed => seed_templates(storage, format),
    }
}

fn load_template(storage: &TemplateStorage, id: &str) -> Result<ContentTemplate, ContentOpsError> {
    storage
        .get(id)?
        .ok_or_else(|| ContentOpsError::NotFound(format!("Template: {id}")))
}

fn add_template(
    storage: &TemplateStorage,
    file: &Path,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    let template: ContentTemplate = read_yaml(file)?;
    let saved = storage.save(&template)?;

    match format {
        OutputFormat::Json => to_json(&saved),
        OutputFormat::Pretty => {
            let mut output = format!("Saved template: {} (ID: {})", saved.name, saved.id);
            let undeclared = saved.undeclared_variables();
            if !undeclared.is_empty() {
                output.push_str(&format!(
                    "\nNot declared, left as-is when rendering: {}",
                    undeclared.join(", ")
                ));
            }
            Ok(output)
        }
    }
}

/// Render a template in preview mode.
fn preview_template(
    storage: &TemplateStorage,
    id: &str,
    blog: Option<&Path>,
    vars: &[String],
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    let template = load_template(storage, id)?;

    let mut context = match blog {
        Some(path) => {
            let blog: BlogPublishedTrigger = read_yaml(path)?;
            build_template_context(
                &TriggerPayload::BlogPublished(blog),
                template.platform.platform(),
                local_today(),
            )
        }
        None => TemplateContext::new(),
    };

    let vars = parse_vars(vars).map_err(|entry| {
        ContentOpsError::Validation(format!("variable '{entry}': expected KEY=VALUE"))
    })?;
    for (key, value) in vars {
        context.set(key, value);
    }

    let rendered = render(&template, &context, RenderMode::Preview)?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "id": template.id,
            "name": template.name,
            "rendered": rendered,
        })),
        OutputFormat::Pretty => Ok(rendered),
    }
}

fn delete_template(
    storage: &TemplateStorage,
    id: &str,
    force: bool,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    if !force {
        return Err(ContentOpsError::Config(format!(
            "Use --force to delete template '{id}'"
        )));
    }

    if storage.delete(id)? {
        match format {
            OutputFormat::Json => to_json(&serde_json::json!({"deleted": id})),
            OutputFormat::Pretty => Ok(format!("Deleted template: {id}")),
        }
    } else {
        Err(ContentOpsError::NotFound(format!("Template: {id}")))
    }
}

fn seed_templates(storage: &TemplateStorage, format: OutputFormat) -> Result<String, ContentOpsError> {
    let inserted = storage.seed_defaults()?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({"inserted": inserted})),
        OutputFormat::Pretty if inserted == 0 => Ok("Built-in templates already installed".to_string()),
        OutputFormat::Pretty => Ok(format!("Installed {inserted} built-in templates")),
    }
}
