//! Action and rule executors.
//!
//! `ActionExecutor` runs one action against the storage collaborators.
//! `RuleExecutor` runs every action of a rule in order and folds the
//! outcomes into one `ExecutionResult`. A failing action never stops the
//! actions after it.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::action::{ActionOutput, ActionResult, AutomationAction, PostingSuggestion};
use super::rule::AutomationRule;
use super::trigger::TriggerPayload;
use crate::core::{
    format_short_date, local_today, NewsletterRepository, SocialPostRepository, TemplateRepository,
};
use crate::error::ContentOpsError;
use crate::features::content::{CampaignStatus, NewNewsletterCampaign, NewSocialPost, PostStatus};
use crate::features::templates::{
    build_template_context, render, ContentTemplate, Platform, RenderMode, TemplateType,
};

/// Default cap on the number of actions run per rule.
pub const DEFAULT_MAX_ACTIONS: usize = 20;

/// Text injected for `recent_posts` when a newsletter includes blog posts.
const RECENT_POSTS_SUMMARY: &str = "Recent blog posts will appear here.";
/// Text injected for `social_highlights` when a newsletter includes social highlights.
const SOCIAL_HIGHLIGHTS_SUMMARY: &str = "Social media highlights will appear here.";

/// Fixed posting slots: platform, weekday, hour (UTC), score, reason.
const POSTING_SLOTS: [(Platform, Weekday, u32, f64, &str); 2] = [
    (
        Platform::Linkedin,
        Weekday::Tue,
        9,
        85.0,
        "Professional audience is most active on weekday mornings",
    ),
    (
        Platform::Twitter,
        Weekday::Wed,
        12,
        78.0,
        "Lunch-hour browsing peaks mid-week",
    ),
];

/// Runs single actions.
pub struct ActionExecutor {
    templates: Arc<dyn TemplateRepository>,
    social_posts: Arc<dyn SocialPostRepository>,
    newsletters: Arc<dyn NewsletterRepository>,
    default_platform: Platform,
}

impl ActionExecutor {
    /// Create an executor over the given collaborators.
    #[must_use]
    pub fn new(
        templates: Arc<dyn TemplateRepository>,
        social_posts: Arc<dyn SocialPostRepository>,
        newsletters: Arc<dyn NewsletterRepository>,
    ) -> Self {
        Self {
            templates,
            social_posts,
            newsletters,
            default_platform: Platform::default(),
        }
    }

    /// Platform used when a social post action names none.
    #[must_use]
    pub const fn with_default_platform(mut self, platform: Platform) -> Self {
        self.default_platform = platform;
        self
    }

    /// Execute one action.
    ///
    /// Missing templates, render failures and failed saves are reported as
    /// an unsuccessful `ActionResult`.
    ///
    /// # Errors
    ///
    /// Returns an error for unexpected faults, such as a failing template lookup.
    pub async fn execute(
        &self,
        action: &AutomationAction,
        payload: &TriggerPayload,
        rule: &AutomationRule,
    ) -> Result<ActionResult, ContentOpsError> {
        match action {
            AutomationAction::GenerateSocialPost {
                platform,
                template_id,
                schedule_delay_hours,
                auto_publish,
            } => {
                self.generate_social_post(
                    platform.unwrap_or(self.default_platform),
                    template_id.as_deref(),
                    *schedule_delay_hours,
                    *auto_publish,
                    payload,
                )
                .await
            }
            AutomationAction::GenerateNewsletter {
                template_id,
                include_blog_posts,
                include_social_highlights,
                auto_send,
            } => {
                self.generate_newsletter(
                    template_id.as_deref(),
                    *include_blog_posts,
                    *include_social_highlights,
                    *auto_send,
                    payload,
                )
                .await
            }
            AutomationAction::OptimizePostingTime { platforms } => {
                Ok(optimize_posting_time(platforms, Utc::now()))
            }
            AutomationAction::SendNotification {
                notification_type,
                recipients,
            } => {
                let notification_type = notification_type.clone().unwrap_or_else(|| "email".to_string());
                info!(
                    rule_id = %rule.id,
                    rule = %rule.name,
                    notification_type = %notification_type,
                    recipients = ?recipients,
                    "Sending notification"
                );
                Ok(ActionResult::success(ActionOutput::Notification {
                    notification_type,
                    recipients: recipients.clone(),
                }))
            }
            AutomationAction::UpdateAnalytics => {
                info!(rule_id = %rule.id, rule = %rule.name, "Updating analytics");
                Ok(ActionResult::success(ActionOutput::Analytics))
            }
        }
    }

    async fn generate_social_post(
        &self,
        platform: Platform,
        template_id: Option<&str>,
        schedule_delay_hours: Option<i64>,
        auto_publish: bool,
        payload: &TriggerPayload,
    ) -> Result<ActionResult, ContentOpsError> {
        let template = self
            .resolve_template(template_id, TemplateType::Social, Some(platform))
            .await?;
        let Some(template) = template else {
            return Ok(ActionResult::failure(format!(
                "No social template found for {}",
                platform.display_name()
            )));
        };

        let context = build_template_context(payload, Some(platform), local_today());
        let content = match render(&template, &context, RenderMode::Strict) {
            Ok(content) => content,
            Err(e) => return Ok(ActionResult::failure(e.to_string())),
        };

        let scheduled_at = schedule_delay_hours
            .filter(|hours| *hours > 0)
            .map(|hours| Utc::now() + Duration::hours(hours));
        let status = if auto_publish {
            PostStatus::Scheduled
        } else {
            PostStatus::Draft
        };

        let input = NewSocialPost {
            platform,
            content,
            scheduled_at,
            status,
        };
        match self.social_posts.create(input).await {
            Ok(post) => {
                debug!(post_id = %post.id, platform = platform.as_str(), "Created social post");
                Ok(ActionResult::success(ActionOutput::SocialPost {
                    post_id: post.id,
                    platform: post.platform,
                    content: post.content,
                    scheduled_at: post.scheduled_at,
                }))
            }
            Err(e) => Ok(ActionResult::failure(format!("Failed to create social post: {e}"))),
        }
    }

    async fn generate_newsletter(
        &self,
        template_id: Option<&str>,
        include_blog_posts: bool,
        include_social_highlights: bool,
        auto_send: bool,
        payload: &TriggerPayload,
    ) -> Result<ActionResult, ContentOpsError> {
        let template = self
            .resolve_template(template_id, TemplateType::Newsletter, None)
            .await?;
        let Some(template) = template else {
            return Ok(ActionResult::failure("No newsletter template found"));
        };

        let today = local_today();
        let mut context = build_template_context(payload, None, today);
        if include_blog_posts {
            context.set("recent_posts", RECENT_POSTS_SUMMARY);
        }
        if include_social_highlights {
            context.set("social_highlights", SOCIAL_HIGHLIGHTS_SUMMARY);
        }

        let content = match render(&template, &context, RenderMode::Strict) {
            Ok(content) => content,
            Err(e) => return Ok(ActionResult::failure(e.to_string())),
        };

        let input = NewNewsletterCampaign {
            subject: format!("Newsletter - {}", format_short_date(today)),
            content,
            status: if auto_send {
                CampaignStatus::Scheduled
            } else {
                CampaignStatus::Draft
            },
            recipient_count: 0,
        };
        match self.newsletters.create(input).await {
            Ok(campaign) => {
                debug!(campaign_id = %campaign.id, "Created newsletter campaign");
                Ok(ActionResult::success(ActionOutput::Newsletter {
                    campaign_id: campaign.id,
                    subject: campaign.subject,
                    content: campaign.content,
                }))
            }
            Err(e) => Ok(ActionResult::failure(format!("Failed to create newsletter: {e}"))),
        }
    }

    /// Explicit template by ID, else the first template of the type for the platform.
    async fn resolve_template(
        &self,
        template_id: Option<&str>,
        template_type: TemplateType,
        platform: Option<Platform>,
    ) -> Result<Option<ContentTemplate>, ContentOpsError> {
        match template_id {
            Some(id) => self.templates.get_by_id(id).await,
            None => Ok(self
                .templates
                .get_by_type_and_platform(template_type, platform)
                .await?
                .into_iter()
                .next()),
        }
    }
}

/// Suggest posting slots for `platforms` (all when empty).
///
/// Slots come from a fixed table; nothing is rescheduled.
#[must_use]
pub fn optimize_posting_time(platforms: &[Platform], now: DateTime<Utc>) -> ActionResult {
    let optimized_times = POSTING_SLOTS
        .iter()
        .filter(|(platform, ..)| platforms.is_empty() || platforms.contains(platform))
        .map(|&(platform, weekday, hour, engagement_score, reason)| PostingSuggestion {
            platform,
            datetime: next_slot(now, weekday, hour),
            engagement_score,
            reason: reason.to_string(),
        })
        .collect();

    ActionResult::success(ActionOutput::PostingTimes {
        optimized_times,
        applied: Vec::new(),
    })
}

/// Next instant after `now` falling on `weekday` at `hour`:00 UTC.
fn next_slot(now: DateTime<Utc>, weekday: Weekday, hour: u32) -> DateTime<Utc> {
    let days_ahead = i64::from(
        (7 + weekday.num_days_from_monday() - now.weekday().num_days_from_monday()) % 7,
    );
    let Some(candidate) = (now.date_naive() + Duration::days(days_ahead))
        .and_hms_opt(hour, 0, 0)
        .map(|naive| naive.and_utc())
    else {
        return now;
    };

    if candidate > now {
        candidate
    } else {
        candidate + Duration::days(7)
    }
}

/// Outcome of one rule execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Rule ID
    pub rule_id: String,
    /// Rule name
    pub rule_name: String,
    /// True when no action reported an error
    pub success: bool,
    /// Per-action results, in action order
    pub results: Vec<ActionResult>,
    /// Formatted errors
    pub errors: Vec<String>,
    /// IDs of content created by successful actions
    pub created_content_ids: Vec<String>,
    /// Wall-clock time for the whole rule
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    fn started(rule: &AutomationRule) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            success: false,
            results: Vec::new(),
            errors: Vec::new(),
            created_content_ids: Vec::new(),
            execution_time_ms: 0,
        }
    }

    /// A result for a rule that never ran.
    #[must_use]
    pub fn failure(rule_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: String::new(),
            success: false,
            results: Vec::new(),
            errors: vec![error.into()],
            created_content_ids: Vec::new(),
            execution_time_ms: 0,
        }
    }

    /// First error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// Runs a rule's actions in order.
pub struct RuleExecutor {
    actions: ActionExecutor,
    max_actions: usize,
}

impl RuleExecutor {
    /// Create a rule executor.
    #[must_use]
    pub const fn new(actions: ActionExecutor) -> Self {
        Self {
            actions,
            max_actions: DEFAULT_MAX_ACTIONS,
        }
    }

    /// Cap the number of actions run per rule.
    #[must_use]
    pub const fn with_max_actions(mut self, max_actions: usize) -> Self {
        self.max_actions = max_actions;
        self
    }

    /// Run every action of `rule` against `payload`.
    pub async fn execute(&self, rule: &AutomationRule, payload: &TriggerPayload) -> ExecutionResult {
        let started = Instant::now();
        let mut result = ExecutionResult::started(rule);

        for (i, action) in rule.actions.iter().enumerate() {
            let n = i + 1;
            if i >= self.max_actions {
                let message = format!("rule allows at most {} actions", self.max_actions);
                warn!(rule_id = %rule.id, action = n, max_actions = self.max_actions, "Action skipped");
                result.errors.push(format!("Action {n} skipped: {message}"));
                result.results.push(ActionResult::failure(message));
                continue;
            }
            match self.actions.execute(action, payload, rule).await {
                Ok(action_result) => {
                    if action_result.success {
                        if let Some(id) = action_result.content_id() {
                            result.created_content_ids.push(id.to_string());
                        }
                    } else {
                        let message = action_result.error.as_deref().unwrap_or("unknown error");
                        warn!(rule_id = %rule.id, action = n, error = message, "Action failed");
                        result.errors.push(format!("Action {n} failed: {message}"));
                    }
                    result.results.push(action_result);
                }
                Err(e) => {
                    error!(rule_id = %rule.id, action = n, error = %e, "Error executing action");
                    result.errors.push(format!("Error executing action {n}: {e}"));
                    result.results.push(ActionResult::failure(e.to_string()));
                }
            }
        }

        result.success = result.errors.is_empty();
        result.execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MockNewsletterRepository, MockSocialPostRepository, MockTemplateRepository};
    use crate::features::automation::rule::{RuleType, Trigger};
    use crate::features::automation::trigger::{BlogPublishedTrigger, ManualTrigger};
    use crate::features::content::{NewsletterCampaign, SocialPost};
    use crate::features::templates::TemplatePlatform;
    use chrono::TimeZone;

    fn blog_payload() -> TriggerPayload {
        TriggerPayload::BlogPublished(BlogPublishedTrigger {
            title: "X".to_string(),
            url: "https://example.com/x".to_string(),
            content: "Sentence one is right here. Sentence two follows now. Third sentence completes it."
                .to_string(),
            summary: None,
            author: None,
            categories: vec!["Tech".to_string()],
            tags: vec!["AI".to_string()],
            published_at: Utc::now(),
        })
    }

    fn social_template() -> ContentTemplate {
        ContentTemplate::new(
            "Announcement",
            TemplateType::Social,
            TemplatePlatform::Linkedin,
            "{{title}}\n{{key_points}}\n#{{hashtags}}",
        )
        .with_id("t1")
    }

    fn templates_returning(template: Option<ContentTemplate>) -> MockTemplateRepository {
        let mut templates = MockTemplateRepository::new();
        let by_id = template.clone();
        templates
            .expect_get_by_id()
            .returning(move |_| Ok(by_id.clone()));
        templates
            .expect_get_by_type_and_platform()
            .returning(move |_, _| Ok(template.clone().into_iter().collect()));
        templates
    }

    fn storing_posts() -> MockSocialPostRepository {
        let mut posts = MockSocialPostRepository::new();
        posts
            .expect_create()
            .returning(|input| Ok(SocialPost::from_new(input)));
        posts
    }

    fn storing_newsletters() -> MockNewsletterRepository {
        let mut newsletters = MockNewsletterRepository::new();
        newsletters
            .expect_create()
            .returning(|input| Ok(NewsletterCampaign::from_new(input)));
        newsletters
    }

    fn executor(
        templates: MockTemplateRepository,
        posts: MockSocialPostRepository,
        newsletters: MockNewsletterRepository,
    ) -> ActionExecutor {
        ActionExecutor::new(Arc::new(templates), Arc::new(posts), Arc::new(newsletters))
    }

    fn rule_with(actions: Vec<AutomationAction>) -> AutomationRule {
        let mut rule = AutomationRule::new("Announce", RuleType::ContentGeneration, Trigger::blog_published());
        rule.actions = actions;
        rule
    }

    #[tokio::test]
    async fn test_social_post_end_to_end() {
        let actions = executor(templates_returning(Some(social_template())), storing_posts(), storing_newsletters());
        let action = AutomationAction::social_post(None);
        let rule = rule_with(vec![action.clone()]);

        let result = actions.execute(&action, &blog_payload(), &rule).await.unwrap();
        assert!(result.success);

        let Some(ActionOutput::SocialPost { content, platform, scheduled_at, .. }) = result.output else {
            panic!("expected a social post output");
        };
        assert_eq!(platform, Platform::Linkedin);
        assert!(scheduled_at.is_none());
        assert!(content.starts_with("X\n"));
        assert_eq!(content.matches("• ").count(), 3);
        assert!(content.ends_with("#AI #Tech"));
    }

    #[tokio::test]
    async fn test_social_post_schedule_delay() {
        let mut posts = MockSocialPostRepository::new();
        posts
            .expect_create()
            .withf(|input| input.status == PostStatus::Draft && input.scheduled_at.is_some())
            .returning(|input| Ok(SocialPost::from_new(input)));
        let actions = executor(templates_returning(Some(social_template())), posts, storing_newsletters());
        let action = AutomationAction::GenerateSocialPost {
            platform: None,
            template_id: Some("t1".to_string()),
            schedule_delay_hours: Some(2),
            auto_publish: false,
        };
        let rule = rule_with(vec![action.clone()]);

        let before = Utc::now();
        let result = actions.execute(&action, &blog_payload(), &rule).await.unwrap();
        let after = Utc::now();

        let Some(ActionOutput::SocialPost { scheduled_at: Some(at), .. }) = result.output else {
            panic!("expected a scheduled post");
        };
        assert!(at >= before + Duration::hours(2));
        assert!(at <= after + Duration::hours(2));
    }

    #[tokio::test]
    async fn test_social_post_auto_publish_is_scheduled() {
        let mut posts = MockSocialPostRepository::new();
        posts
            .expect_create()
            .withf(|input| input.status == PostStatus::Scheduled && input.scheduled_at.is_none())
            .times(1)
            .returning(|input| Ok(SocialPost::from_new(input)));
        let actions = executor(templates_returning(Some(social_template())), posts, storing_newsletters());
        let action = AutomationAction::GenerateSocialPost {
            platform: Some(Platform::Linkedin),
            template_id: None,
            schedule_delay_hours: Some(0),
            auto_publish: true,
        };

        let result = actions
            .execute(&action, &blog_payload(), &rule_with(vec![action.clone()]))
            .await
            .unwrap();
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_missing_template_fails_action() {
        let actions = executor(templates_returning(None), MockSocialPostRepository::new(), storing_newsletters());
        let action = AutomationAction::social_post(Some(Platform::Twitter));

        let result = actions
            .execute(&action, &blog_payload(), &rule_with(vec![action.clone()]))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No social template found for Twitter"));
    }

    #[tokio::test]
    async fn test_create_failure_fails_action() {
        let mut posts = MockSocialPostRepository::new();
        posts
            .expect_create()
            .returning(|_| Err(ContentOpsError::Database("disk full".to_string())));
        let actions = executor(templates_returning(Some(social_template())), posts, storing_newsletters());
        let action = AutomationAction::social_post(None);

        let result = actions
            .execute(&action, &blog_payload(), &rule_with(vec![action.clone()]))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn test_newsletter() {
        let template = ContentTemplate::new(
            "Weekly",
            TemplateType::Newsletter,
            TemplatePlatform::All,
            "Week of {{week_date}}\n{{recent_posts}}\n{{social_highlights}}",
        );
        let mut newsletters = MockNewsletterRepository::new();
        newsletters
            .expect_create()
            .withf(|input| {
                input.subject.starts_with("Newsletter - ")
                    && input.status == CampaignStatus::Draft
                    && input.recipient_count == 0
            })
            .returning(|input| Ok(NewsletterCampaign::from_new(input)));
        let actions = executor(templates_returning(Some(template)), MockSocialPostRepository::new(), newsletters);
        let action = AutomationAction::GenerateNewsletter {
            template_id: None,
            include_blog_posts: true,
            include_social_highlights: false,
            auto_send: false,
        };

        let result = actions
            .execute(
                &action,
                &TriggerPayload::Manual(ManualTrigger::default()),
                &rule_with(vec![action.clone()]),
            )
            .await
            .unwrap();

        let Some(ActionOutput::Newsletter { content, .. }) = result.output else {
            panic!("expected a newsletter output");
        };
        assert!(content.contains(RECENT_POSTS_SUMMARY));
        assert!(!content.contains(SOCIAL_HIGHLIGHTS_SUMMARY));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_optimize_posting_time() {
        // 2024-06-03 is a Monday
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let result = optimize_posting_time(&[], now);

        let Some(ActionOutput::PostingTimes { optimized_times, applied }) = result.output else {
            panic!("expected posting times");
        };
        assert!(applied.is_empty());
        assert_eq!(optimized_times.len(), 2);
        assert_eq!(optimized_times[0].datetime, Utc.with_ymd_and_hms(2024, 6, 4, 9, 0, 0).unwrap());
        assert_eq!(optimized_times[1].datetime, Utc.with_ymd_and_hms(2024, 6, 5, 12, 0, 0).unwrap());

        let twitter_only = optimize_posting_time(&[Platform::Twitter], now);
        let Some(ActionOutput::PostingTimes { optimized_times, .. }) = twitter_only.output else {
            panic!("expected posting times");
        };
        assert_eq!(optimized_times.len(), 1);
        assert_eq!(optimized_times[0].platform, Platform::Twitter);
    }

    #[test]
    fn test_next_slot_same_day_already_passed() {
        let tuesday_noon = Utc.with_ymd_and_hms(2024, 6, 4, 12, 0, 0).unwrap();
        assert_eq!(
            next_slot(tuesday_noon, Weekday::Tue, 9),
            Utc.with_ymd_and_hms(2024, 6, 11, 9, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_rule_executor_continues_after_fault() {
        let mut templates = MockTemplateRepository::new();
        templates.expect_get_by_id().returning(|id| {
            if id == "broken" {
                Err(ContentOpsError::Database("connection reset".to_string()))
            } else {
                Ok(Some(social_template()))
            }
        });
        let executor = RuleExecutor::new(executor(templates, storing_posts(), storing_newsletters()));

        let with_template = |id: &str| AutomationAction::GenerateSocialPost {
            platform: None,
            template_id: Some(id.to_string()),
            schedule_delay_hours: None,
            auto_publish: false,
        };
        let rule = rule_with(vec![with_template("t1"), with_template("broken"), with_template("t1")]);

        let result = executor.execute(&rule, &blog_payload()).await;
        assert!(!result.success);
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Error executing action 2:"));
        assert_eq!(result.created_content_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_rule_executor_formats_action_failures() {
        let executor = RuleExecutor::new(executor(
            templates_returning(None),
            MockSocialPostRepository::new(),
            storing_newsletters(),
        ));
        let rule = rule_with(vec![
            AutomationAction::UpdateAnalytics,
            AutomationAction::social_post(None),
            AutomationAction::notify("slack", vec!["#marketing".to_string()]),
        ]);

        let result = executor.execute(&rule, &blog_payload()).await;
        assert!(!result.success);
        assert_eq!(result.errors, vec!["Action 2 failed: No social template found for LinkedIn"]);
        assert!(result.results[0].success);
        assert!(result.results[2].success);
        assert!(result.created_content_ids.is_empty());
    }

    #[tokio::test]
    async fn test_rule_executor_reports_actions_over_limit() {
        let executor = RuleExecutor::new(executor(
            MockTemplateRepository::new(),
            MockSocialPostRepository::new(),
            MockNewsletterRepository::new(),
        ))
        .with_max_actions(2);
        let rule = rule_with(vec![AutomationAction::UpdateAnalytics; 3]);

        let result = executor.execute(&rule, &blog_payload()).await;
        assert!(!result.success);
        assert_eq!(result.results.len(), 3);
        assert!(result.results[0].success);
        assert!(result.results[1].success);
        assert!(!result.results[2].success);
        assert_eq!(result.errors, vec!["Action 3 skipped: rule allows at most 2 actions"]);
    }
}
