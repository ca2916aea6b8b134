//! Storage collaborators used by the automation engine.
//!
//! The engine only talks to these traits; the SQLite stores implement them
//! and tests substitute mocks.

use async_trait::async_trait;

use crate::error::ContentOpsError;
use crate::features::automation::rule::{AutomationRule, TriggerType};
use crate::features::content::{NewNewsletterCampaign, NewSocialPost, NewsletterCampaign, SocialPost};
use crate::features::templates::{ContentTemplate, Platform, TemplateType};

/// Read access to rules plus execution bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Active rules with the given trigger type.
    async fn get_active_rules_by_trigger(
        &self,
        trigger_type: TriggerType,
    ) -> Result<Vec<AutomationRule>, ContentOpsError>;

    /// A rule by ID.
    async fn get_by_id(&self, id: &str) -> Result<Option<AutomationRule>, ContentOpsError>;

    /// Increment `execution_count` and set `last_executed` to now.
    async fn update_execution(&self, id: &str) -> Result<(), ContentOpsError>;
}

/// Template lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// A template by ID.
    async fn get_by_id(&self, id: &str) -> Result<Option<ContentTemplate>, ContentOpsError>;

    /// Active templates of a type serving `platform`; `None` matches every platform.
    async fn get_by_type_and_platform(
        &self,
        template_type: TemplateType,
        platform: Option<Platform>,
    ) -> Result<Vec<ContentTemplate>, ContentOpsError>;
}

/// Social post persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialPostRepository: Send + Sync {
    /// Save a new post.
    async fn create(&self, input: NewSocialPost) -> Result<SocialPost, ContentOpsError>;
}

/// Newsletter campaign persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Save a new campaign.
    async fn create(&self, input: NewNewsletterCampaign) -> Result<NewsletterCampaign, ContentOpsError>;
}
