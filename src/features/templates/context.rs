//! Render context built from trigger data.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::types::Platform;
use crate::core::format_short_date;
use crate::features::automation::trigger::{BlogPublishedTrigger, TriggerPayload};

/// Key points must be longer than this many characters.
const KEY_POINT_MIN_CHARS: usize = 20;
/// Number of key points taken from the content.
const KEY_POINT_COUNT: usize = 3;

/// A single context value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Plain text
    Text(String),
    /// List of strings, rendered comma separated
    List(Vec<String>),
}

impl ContextValue {
    /// String form used for substitution.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<String>> for ContextValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

/// Variable name to value mapping for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateContext {
    values: BTreeMap<String, ContextValue>,
}

impl TemplateContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Look up a value as text.
    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.values.get(key).map(ContextValue::render)
    }

    /// Whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.values.iter()
    }

    /// Overlay plain string variables.
    pub fn extend_text<'a, I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in vars {
            self.set(key.clone(), value.clone());
        }
    }

    fn insert_blog(&mut self, blog: &BlogPublishedTrigger) {
        self.set("title", blog.title.clone());
        self.set("url", blog.url.clone());
        self.set("content", blog.content.clone());
        self.set("summary", blog.summary.clone().unwrap_or_default());
        self.set("author", blog.author.clone().unwrap_or_default());
        self.set(
            "published_date",
            format_short_date(blog.published_at.with_timezone(&Local).date_naive()),
        );
        self.set("categories", blog.categories.clone());
        self.set("tags", blog.tags.clone());
        self.set("key_points", extract_key_points(&blog.content).join("\n"));
        self.set("hashtags", build_hashtags(&blog.tags, &blog.categories));
    }
}

/// Build the render context for one action execution.
///
/// `today` supplies `week_date`; `platform` is the executing action's platform.
#[must_use]
pub fn build_template_context(
    trigger: &TriggerPayload,
    platform: Option<Platform>,
    today: NaiveDate,
) -> TemplateContext {
    let mut ctx = TemplateContext::new();

    match trigger {
        TriggerPayload::BlogPublished(blog) => ctx.insert_blog(blog),
        TriggerPayload::TimeBased(tick) => {
            ctx.set("trigger_date", format_short_date(tick.trigger_date));
            ctx.set("scheduled_time", tick.scheduled_time.to_rfc3339());
            ctx.extend_text(&tick.context);
        }
        TriggerPayload::EngagementThreshold(engagement) => {
            ctx.set("post_id", engagement.post_id.clone());
            ctx.set("metric", engagement.metric.clone());
            ctx.set("metric_value", engagement.value.to_string());
            ctx.set("threshold", engagement.threshold.to_string());
        }
        TriggerPayload::Manual(manual) => {
            if let Some(blog) = &manual.blog {
                ctx.insert_blog(blog);
            }
            ctx.extend_text(&manual.variables);
        }
    }

    if let Some(platform) = platform {
        ctx.set("platform", platform.display_name());
    }
    ctx.set("week_date", format_short_date(today));

    ctx
}

/// First sentences of `content` long enough to stand alone, bulleted.
///
/// Splits on `.`, `!` and `?`; order is preserved and nothing is deduplicated.
#[must_use]
pub fn extract_key_points(content: &str) -> Vec<String> {
    content
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > KEY_POINT_MIN_CHARS)
        .take(KEY_POINT_COUNT)
        .map(|s| format!("• {s}"))
        .collect()
}

/// Tags then categories with whitespace removed, joined by `" #"`.
///
/// The first entry carries no `#`; templates write `#{{hashtags}}`.
#[must_use]
pub fn build_hashtags(tags: &[String], categories: &[String]) -> String {
    tags.iter()
        .chain(categories)
        .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" #")
}
