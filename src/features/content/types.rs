//! Generated content: social posts and newsletter campaigns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ContentOpsError;
use crate::features::templates::Platform;

/// Lifecycle state of a social post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Saved for review
    #[default]
    Draft,
    /// Queued for publication
    Scheduled,
    /// Already published
    Published,
}

impl PostStatus {
    /// Stable storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }

    /// Parse from a storage key.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys.
    pub fn parse(s: &str) -> Result<Self, ContentOpsError> {
        match s {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            other => Err(ContentOpsError::Validation(format!("post status: {other}"))),
        }
    }
}

/// Lifecycle state of a newsletter campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Saved for review
    #[default]
    Draft,
    /// Queued for sending
    Scheduled,
    /// Already sent
    Sent,
}

impl CampaignStatus {
    /// Stable storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Sent => "sent",
        }
    }

    /// Parse from a storage key.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys.
    pub fn parse(s: &str) -> Result<Self, ContentOpsError> {
        match s {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "sent" => Ok(Self::Sent),
            other => Err(ContentOpsError::Validation(format!("campaign status: {other}"))),
        }
    }
}

/// Input for creating a social post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSocialPost {
    /// Target platform
    pub platform: Platform,
    /// Post text
    pub content: String,
    /// Publication time, if scheduled
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Initial status
    pub status: PostStatus,
}

/// A saved social post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPost {
    /// Post ID
    pub id: String,
    /// Target platform
    pub platform: Platform,
    /// Post text
    pub content: String,
    /// Publication time, if scheduled
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Status
    pub status: PostStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl SocialPost {
    /// Materialize a new post with a fresh ID.
    #[must_use]
    pub fn from_new(input: NewSocialPost) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            platform: input.platform,
            content: input.content,
            scheduled_at: input.scheduled_at,
            status: input.status,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a newsletter campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNewsletterCampaign {
    /// Subject line
    pub subject: String,
    /// Body
    pub content: String,
    /// Initial status
    pub status: CampaignStatus,
    /// Number of recipients
    pub recipient_count: i64,
}

/// A saved newsletter campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterCampaign {
    /// Campaign ID
    pub id: String,
    /// Subject line
    pub subject: String,
    /// Body
    pub content: String,
    /// Status
    pub status: CampaignStatus,
    /// Number of recipients
    pub recipient_count: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl NewsletterCampaign {
    /// Materialize a new campaign with a fresh ID.
    #[must_use]
    pub fn from_new(input: NewNewsletterCampaign) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject: input.subject,
            content: input.content,
            status: input.status,
            recipient_count: input.recipient_count,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_keys() {
        for status in [PostStatus::Draft, PostStatus::Scheduled, PostStatus::Published] {
            assert_eq!(PostStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(CampaignStatus::parse("bounced").is_err());
        assert_eq!(CampaignStatus::parse("sent").unwrap(), CampaignStatus::Sent);
    }

    #[test]
    fn test_from_new_assigns_id() {
        let post = SocialPost::from_new(NewSocialPost {
            platform: Platform::Twitter,
            content: "Hello".to_string(),
            scheduled_at: None,
            status: PostStatus::Draft,
        });
        assert!(!post.id.is_empty());
        assert_eq!(post.platform, Platform::Twitter);
    }
}
