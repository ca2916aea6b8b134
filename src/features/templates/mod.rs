//! Content templates for contentops.
//!
//! Templates are strings with `{{variable}}` placeholders. This module
//! stores them, builds render contexts from trigger payloads and renders
//! them into post and newsletter bodies.

mod context;
mod render;
mod storage;
mod types;

pub use context::{build_hashtags, build_template_context, extract_key_points, ContextValue, TemplateContext};
pub use render::{extract_variables, render, render_str, RenderMode};
pub use storage::{default_templates, TemplateStorage};
pub use types::{ContentTemplate, Platform, TemplatePlatform, TemplateType};
