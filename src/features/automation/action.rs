//! Actions for automation rules.
//!
//! Actions define what happens when a rule fires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::templates::Platform;

/// One unit of work a rule performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AutomationAction {
    /// Render a social template and save the post.
    GenerateSocialPost {
        /// Target platform (defaults to the configured platform)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<Platform>,
        /// Explicit template; otherwise the first social template for the platform
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template_id: Option<String>,
        /// Schedule this many hours from now when positive
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schedule_delay_hours: Option<i64>,
        /// Save as scheduled instead of draft
        #[serde(default)]
        auto_publish: bool,
    },
    /// Render a newsletter template and save the campaign.
    GenerateNewsletter {
        /// Explicit template; otherwise the first newsletter template
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template_id: Option<String>,
        /// Add a recent blog posts section
        #[serde(default)]
        include_blog_posts: bool,
        /// Add a social highlights section
        #[serde(default)]
        include_social_highlights: bool,
        /// Save as scheduled instead of draft
        #[serde(default)]
        auto_send: bool,
    },
    /// Suggest posting times per platform.
    OptimizePostingTime {
        /// Platforms to suggest for; empty means all
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        platforms: Vec<Platform>,
    },
    /// Notify people that the rule ran.
    SendNotification {
        /// Free-form kind, e.g. `email` or `slack`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notification_type: Option<String>,
        /// Recipients
        #[serde(default)]
        recipients: Vec<String>,
    },
    /// Refresh analytics.
    UpdateAnalytics,
}

impl AutomationAction {
    /// Social post action with defaults.
    #[must_use]
    pub const fn social_post(platform: Option<Platform>) -> Self {
        Self::GenerateSocialPost {
            platform,
            template_id: None,
            schedule_delay_hours: None,
            auto_publish: false,
        }
    }

    /// Newsletter action with defaults.
    #[must_use]
    pub const fn newsletter() -> Self {
        Self::GenerateNewsletter {
            template_id: None,
            include_blog_posts: false,
            include_social_highlights: false,
            auto_send: false,
        }
    }

    /// Notification action.
    #[must_use]
    pub fn notify(notification_type: impl Into<String>, recipients: Vec<String>) -> Self {
        Self::SendNotification {
            notification_type: Some(notification_type.into()),
            recipients,
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::GenerateSocialPost { .. } => "Generate Social Post",
            Self::GenerateNewsletter { .. } => "Generate Newsletter",
            Self::OptimizePostingTime { .. } => "Optimize Posting Time",
            Self::SendNotification { .. } => "Send Notification",
            Self::UpdateAnalytics => "Update Analytics",
        }
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns a description of the invalid field.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::GenerateSocialPost {
                schedule_delay_hours: Some(hours),
                ..
            } if *hours < 0 => Err(format!("schedule_delay_hours must not be negative, got {hours}")),
            Self::GenerateSocialPost {
                template_id: Some(id),
                ..
            }
            | Self::GenerateNewsletter {
                template_id: Some(id),
                ..
            } if id.trim().is_empty() => Err("template_id is empty".to_string()),
            _ => Ok(()),
        }
    }
}

/// A suggested posting slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingSuggestion {
    /// Platform
    pub platform: Platform,
    /// Suggested publication time
    pub datetime: DateTime<Utc>,
    /// Expected engagement, 0-100
    pub engagement_score: f64,
    /// Why this slot was chosen
    pub reason: String,
}

/// Type-specific output of a successful action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutput {
    /// A social post was saved
    SocialPost {
        /// Post ID
        post_id: String,
        /// Platform
        platform: Platform,
        /// Rendered text
        content: String,
        /// Schedule time, if scheduled
        scheduled_at: Option<DateTime<Utc>>,
    },
    /// A newsletter campaign was saved
    Newsletter {
        /// Campaign ID
        campaign_id: String,
        /// Subject line
        subject: String,
        /// Rendered body
        content: String,
    },
    /// Posting time suggestions
    PostingTimes {
        /// Suggested slots
        optimized_times: Vec<PostingSuggestion>,
        /// Posts rescheduled as a result
        applied: Vec<String>,
    },
    /// A notification was dispatched
    Notification {
        /// Kind of notification
        notification_type: String,
        /// Recipients
        recipients: Vec<String>,
    },
    /// Analytics were refreshed
    Analytics,
}

/// Result of executing an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the action succeeded
    pub success: bool,
    /// Error if failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Type-specific output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<ActionOutput>,
}

impl ActionResult {
    /// Create a success result.
    #[must_use]
    pub const fn success(output: ActionOutput) -> Self {
        Self {
            success: true,
            error: None,
            output: Some(output),
        }
    }

    /// Create a failure result.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            output: None,
        }
    }

    /// ID of content created by the action, if any.
    #[must_use]
    pub fn content_id(&self) -> Option<&str> {
        match &self.output {
            Some(ActionOutput::SocialPost { post_id, .. }) => Some(post_id),
            Some(ActionOutput::Newsletter { campaign_id, .. }) => Some(campaign_id),
            _ => None,
        }
    }
}
