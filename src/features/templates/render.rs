//! Placeholder substitution for content templates.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::context::TemplateContext;
use super::types::ContentTemplate;
use crate::error::ContentOpsError;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}")
        .unwrap_or_else(|e| panic!("Invalid placeholder regex: {e}"))
});

// Any `{{...}}` pair. Declared names are matched literally against its content.
static ANY_BRACES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([^{}]*)\}\}").unwrap_or_else(|e| panic!("Invalid brace regex: {e}"))
});

/// How missing context values are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Missing values become the empty string.
    #[default]
    Strict,
    /// Missing values become a visible `[name]` marker.
    Preview,
}

/// Distinct placeholder names in order of first appearance.
#[must_use]
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Render a template against a context.
///
/// Only variables declared on the template are substituted; other
/// placeholders are left untouched.
///
/// # Errors
///
/// Returns `ContentOpsError::Template` if the body is empty or contains an
/// unterminated `{{`.
pub fn render(
    template: &ContentTemplate,
    context: &TemplateContext,
    mode: RenderMode,
) -> Result<String, ContentOpsError> {
    render_str(&template.content_template, &template.variables, context, mode)
        .map_err(|e| match e {
            ContentOpsError::Template(msg) => {
                ContentOpsError::Template(format!("{msg} in template '{}'", template.name))
            }
            other => other,
        })
}

/// Render a raw template body with an explicit variable list.
///
/// # Errors
///
/// Returns `ContentOpsError::Template` if the body is empty or contains an
/// unterminated `{{`.
pub fn render_str(
    body: &str,
    variables: &[String],
    context: &TemplateContext,
    mode: RenderMode,
) -> Result<String, ContentOpsError> {
    if body.trim().is_empty() {
        return Err(ContentOpsError::Template("Template body is empty".to_string()));
    }

    if ANY_BRACES.replace_all(body, "").contains("{{") {
        return Err(ContentOpsError::Template("Unterminated placeholder".to_string()));
    }

    let rendered = ANY_BRACES.replace_all(body, |caps: &Captures<'_>| {
        let name = &caps[1];
        if !variables.iter().any(|v| v == name) {
            return caps[0].to_string();
        }
        match context.get(name) {
            Some(value) => value.render(),
            None => match mode {
                RenderMode::Strict => String::new(),
                RenderMode::Preview => format!("[{name}]"),
            }
        }
    });

    Ok(rendered.into_owned())
}
