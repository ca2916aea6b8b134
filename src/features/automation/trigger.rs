//! Inbound trigger payloads.
//!
//! Payloads are inputs to the engine, never stored.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::rule::TriggerType;

/// A blog article was published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPublishedTrigger {
    /// Article title
    pub title: String,
    /// Public URL
    pub url: String,
    /// Article body
    #[serde(default)]
    pub content: String,
    /// Short summary
    #[serde(default)]
    pub summary: Option<String>,
    /// Author name
    #[serde(default)]
    pub author: Option<String>,
    /// Blog categories
    #[serde(default)]
    pub categories: Vec<String>,
    /// Blog tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Publication time
    #[serde(default = "Utc::now")]
    pub published_at: DateTime<Utc>,
}

/// A scheduler tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBasedTrigger {
    /// Time the tick was scheduled for
    pub scheduled_time: DateTime<Utc>,
    /// Calendar date of the tick
    pub trigger_date: NaiveDate,
    /// Extra render variables
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl TimeBasedTrigger {
    /// Tick payload for a given instant.
    #[must_use]
    pub fn at(scheduled_time: DateTime<Utc>) -> Self {
        Self {
            scheduled_time,
            trigger_date: scheduled_time.date_naive(),
            context: BTreeMap::new(),
        }
    }
}

/// A post crossed an engagement threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementThresholdTrigger {
    /// Post that crossed the threshold
    pub post_id: String,
    /// Metric name (likes, shares, ...)
    pub metric: String,
    /// Observed value
    pub value: f64,
    /// Configured threshold
    pub threshold: f64,
}

/// An admin ran a rule by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualTrigger {
    /// Who asked for the run
    #[serde(default)]
    pub requested_by: Option<String>,
    /// Blog article to generate content from
    #[serde(default)]
    pub blog: Option<BlogPublishedTrigger>,
    /// Extra render variables, applied last
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Any trigger payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger_type", rename_all = "snake_case")]
pub enum TriggerPayload {
    /// Blog published webhook
    BlogPublished(BlogPublishedTrigger),
    /// Scheduler tick
    TimeBased(TimeBasedTrigger),
    /// Engagement threshold crossed
    EngagementThreshold(EngagementThresholdTrigger),
    /// Manual run
    Manual(ManualTrigger),
}

impl TriggerPayload {
    /// The trigger type this payload belongs to.
    #[must_use]
    pub const fn trigger_type(&self) -> TriggerType {
        match self {
            Self::BlogPublished(_) => TriggerType::BlogPublished,
            Self::TimeBased(_) => TriggerType::TimeBased,
            Self::EngagementThreshold(_) => TriggerType::EngagementThreshold,
            Self::Manual(_) => TriggerType::Manual,
        }
    }

    /// Categories carried by the payload, if it describes a blog article.
    #[must_use]
    pub fn blog_categories(&self) -> Option<&[String]> {
        match self {
            Self::BlogPublished(blog) => Some(&blog.categories),
            Self::Manual(ManualTrigger { blog: Some(blog), .. }) => Some(&blog.categories),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_payload_defaults() {
        let json = r#"{"title": "Hello", "url": "https://example.com/hello"}"#;
        let blog: BlogPublishedTrigger = serde_json::from_str(json).unwrap();

        assert!(blog.categories.is_empty());
        assert!(blog.summary.is_none());
        assert_eq!(blog.content, "");
    }

    #[test]
    fn test_tagged_payload() {
        let json = r#"{
            "trigger_type": "blog_published",
            "title": "Hello",
            "url": "https://example.com/hello",
            "categories": ["Tech"]
        }"#;
        let payload: TriggerPayload = serde_json::from_str(json).unwrap();

        assert_eq!(payload.trigger_type(), TriggerType::BlogPublished);
        assert_eq!(payload.blog_categories().unwrap(), vec!["Tech".to_string()].as_slice());
    }

    #[test]
    fn test_manual_payload_without_blog() {
        let payload = TriggerPayload::Manual(ManualTrigger::default());
        assert_eq!(payload.trigger_type(), TriggerType::Manual);
        assert!(payload.blog_categories().is_none());
    }
}
