//! Automation rule definitions.
//!
//! A rule pairs a trigger (with its conditions) with an ordered list of
//! actions. The engine only ever touches `execution_count` and
//! `last_executed`.

use chrono::{DateTime, Utc, Weekday};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::action::AutomationAction;
use crate::error::ContentOpsError;

/// An automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationRule {
    /// Unique rule ID
    #[serde(default = "new_id")]
    pub id: String,
    /// Rule name
    pub name: String,
    /// Rule description
    #[serde(default)]
    pub description: Option<String>,
    /// What the rule is for (display only)
    pub rule_type: RuleType,
    /// Trigger and its conditions
    pub trigger: Trigger,
    /// Actions, run in order
    #[serde(default)]
    pub actions: Vec<AutomationAction>,
    /// Whether the rule is active
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Display ordering (lower first); not enforced at run time
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Number of successful executions
    #[serde(default)]
    pub execution_count: i64,
    /// Last successful execution
    #[serde(default)]
    pub last_executed: Option<DateTime<Utc>>,
    /// Creation time
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_priority() -> i32 {
    100
}

impl AutomationRule {
    /// Create a new active rule.
    #[must_use]
    pub fn new(name: impl Into<String>, rule_type: RuleType, trigger: Trigger) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.into(),
            description: None,
            rule_type,
            trigger,
            actions: Vec::new(),
            is_active: true,
            priority: default_priority(),
            execution_count: 0,
            last_executed: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an action.
    #[must_use]
    pub fn with_action(mut self, action: AutomationAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Set priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Set the last execution time.
    #[must_use]
    pub fn with_last_executed(mut self, last_executed: DateTime<Utc>) -> Self {
        self.last_executed = Some(last_executed);
        self
    }

    /// The rule's trigger type.
    #[must_use]
    pub const fn trigger_type(&self) -> TriggerType {
        self.trigger.trigger_type()
    }

    /// Validate the rule before saving.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<(), ContentOpsError> {
        if self.name.trim().is_empty() {
            return Err(ContentOpsError::Validation("rule: name is empty".to_string()));
        }
        if self.actions.is_empty() {
            return Err(ContentOpsError::Validation(format!(
                "rule '{}': at least one action is required",
                self.name
            )));
        }
        if let Trigger::TimeBased(TimeSchedule { hour: Some(hour), .. }) = &self.trigger {
            if *hour > 23 {
                return Err(ContentOpsError::Validation(format!(
                    "rule '{}': hour must be 0-23, got {hour}",
                    self.name
                )));
            }
        }
        for (i, action) in self.actions.iter().enumerate() {
            action.validate().map_err(|msg| {
                ContentOpsError::Validation(format!("rule '{}': action {}: {msg}", self.name, i + 1))
            })?;
        }
        Ok(())
    }

    /// Reject rules with more than `max_actions` actions.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the limit.
    pub fn check_action_limit(&self, max_actions: usize) -> Result<(), ContentOpsError> {
        if self.actions.len() > max_actions {
            return Err(ContentOpsError::Validation(format!(
                "rule '{}': {} actions exceed the limit of {max_actions}",
                self.name,
                self.actions.len()
            )));
        }
        Ok(())
    }
}

/// What a rule is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Generates new content
    ContentGeneration,
    /// Schedules existing content
    Scheduling,
    /// Promotes content across channels
    CrossPromotion,
    /// Tunes posting behavior
    Optimization,
}

impl RuleType {
    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::ContentGeneration => "Content Generation",
            Self::Scheduling => "Scheduling",
            Self::CrossPromotion => "Cross Promotion",
            Self::Optimization => "Optimization",
        }
    }

    /// Stable storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ContentGeneration => "content_generation",
            Self::Scheduling => "scheduling",
            Self::CrossPromotion => "cross_promotion",
            Self::Optimization => "optimization",
        }
    }

    /// Parse from a storage key.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys.
    pub fn parse(s: &str) -> Result<Self, ContentOpsError> {
        match s {
            "content_generation" => Ok(Self::ContentGeneration),
            "scheduling" => Ok(Self::Scheduling),
            "cross_promotion" => Ok(Self::CrossPromotion),
            "optimization" => Ok(Self::Optimization),
            other => Err(ContentOpsError::Validation(format!("rule type: {other}"))),
        }
    }
}

/// Kinds of triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// A blog article was published
    BlogPublished,
    /// Periodic schedule
    TimeBased,
    /// Engagement crossed a threshold
    EngagementThreshold,
    /// Run on request
    Manual,
}

impl TriggerType {
    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::BlogPublished => "Blog Published",
            Self::TimeBased => "Time Based",
            Self::EngagementThreshold => "Engagement Threshold",
            Self::Manual => "Manual",
        }
    }

    /// Stable storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BlogPublished => "blog_published",
            Self::TimeBased => "time_based",
            Self::EngagementThreshold => "engagement_threshold",
            Self::Manual => "manual",
        }
    }
}

/// A trigger with its conditions.
///
/// Blog and engagement triggers may omit `trigger_conditions`, which then
/// match everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TriggerRepr", into = "TriggerRepr")]
pub enum Trigger {
    /// Fires when a blog article is published.
    BlogPublished(BlogConditions),
    /// Fires on a daily, weekly or monthly schedule.
    TimeBased(TimeSchedule),
    /// Fires when engagement crosses a threshold.
    EngagementThreshold(EngagementConditions),
    /// Fires only when run by hand.
    Manual,
}

impl Trigger {
    /// Blog trigger accepting every category.
    #[must_use]
    pub fn blog_published() -> Self {
        Self::BlogPublished(BlogConditions::default())
    }

    /// Blog trigger restricted to categories.
    #[must_use]
    pub fn blog_published_in(categories: Vec<String>) -> Self {
        Self::BlogPublished(BlogConditions {
            blog_categories: Some(CategoryFilter::Only(categories)),
        })
    }

    /// Time-based trigger.
    #[must_use]
    pub const fn time_based(schedule: TimeSchedule) -> Self {
        Self::TimeBased(schedule)
    }

    /// The trigger type.
    #[must_use]
    pub const fn trigger_type(&self) -> TriggerType {
        match self {
            Self::BlogPublished(_) => TriggerType::BlogPublished,
            Self::TimeBased(_) => TriggerType::TimeBased,
            Self::EngagementThreshold(_) => TriggerType::EngagementThreshold,
            Self::Manual => TriggerType::Manual,
        }
    }
}

/// Wire form: `trigger_type` plus optional `trigger_conditions`.
#[derive(Serialize, Deserialize)]
struct TriggerRepr {
    trigger_type: TriggerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trigger_conditions: Option<Value>,
}

impl TryFrom<TriggerRepr> for Trigger {
    type Error = String;

    fn try_from(repr: TriggerRepr) -> Result<Self, Self::Error> {
        let conditions = repr.trigger_conditions.filter(|v| !v.is_null());
        match repr.trigger_type {
            TriggerType::BlogPublished => conditions_or_default(conditions).map(Self::BlogPublished),
            TriggerType::TimeBased => {
                let value =
                    conditions.ok_or("time_based trigger requires trigger_conditions")?;
                serde_json::from_value(value)
                    .map(Self::TimeBased)
                    .map_err(|e| format!("time_based trigger_conditions: {e}"))
            }
            TriggerType::EngagementThreshold => {
                conditions_or_default(conditions).map(Self::EngagementThreshold)
            }
            TriggerType::Manual => Ok(Self::Manual),
        }
    }
}

fn conditions_or_default<T: DeserializeOwned + Default>(value: Option<Value>) -> Result<T, String> {
    value.map_or_else(
        || Ok(T::default()),
        |v| serde_json::from_value(v).map_err(|e| format!("trigger_conditions: {e}")),
    )
}

impl From<Trigger> for TriggerRepr {
    fn from(trigger: Trigger) -> Self {
        let trigger_type = trigger.trigger_type();
        // Plain structs with string keys always convert.
        let trigger_conditions = match trigger {
            Trigger::BlogPublished(c) => serde_json::to_value(c).ok(),
            Trigger::TimeBased(s) => serde_json::to_value(s).ok(),
            Trigger::EngagementThreshold(c) => serde_json::to_value(c).ok(),
            Trigger::Manual => None,
        };
        Self {
            trigger_type,
            trigger_conditions,
        }
    }
}

/// Conditions for blog-published triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogConditions {
    /// Categories to react to; absent means every category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_categories: Option<CategoryFilter>,
}

/// Category selection for blog triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategoryFilterRepr", into = "CategoryFilterRepr")]
pub enum CategoryFilter {
    /// Every category matches
    All,
    /// Only these categories match
    Only(Vec<String>),
}

impl CategoryFilter {
    /// Whether any of `categories` is selected.
    #[must_use]
    pub fn matches(&self, categories: &[String]) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => categories.iter().any(|c| selected.contains(c)),
        }
    }
}

/// Wire form: the string `"all"` or a list that may contain `"all"`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CategoryFilterRepr {
    Keyword(String),
    List(Vec<String>),
}

const ALL_CATEGORIES: &str = "all";

impl From<CategoryFilterRepr> for CategoryFilter {
    fn from(repr: CategoryFilterRepr) -> Self {
        match repr {
            CategoryFilterRepr::Keyword(k) if k == ALL_CATEGORIES => Self::All,
            CategoryFilterRepr::Keyword(k) => Self::Only(vec![k]),
            CategoryFilterRepr::List(list) if list.iter().any(|c| c == ALL_CATEGORIES) => Self::All,
            CategoryFilterRepr::List(list) => Self::Only(list),
        }
    }
}

impl From<CategoryFilter> for CategoryFilterRepr {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => Self::Keyword(ALL_CATEGORIES.to_string()),
            CategoryFilter::Only(list) => Self::List(list),
        }
    }
}

/// Schedule for time-based triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSchedule {
    /// Period
    pub schedule: ScheduleKind,
    /// Day of week, only meaningful for weekly schedules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
    /// Hour of day (0-23) the rule may fire in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
}

impl TimeSchedule {
    /// Daily schedule.
    #[must_use]
    pub const fn daily() -> Self {
        Self {
            schedule: ScheduleKind::Daily,
            day: None,
            hour: None,
        }
    }

    /// Weekly schedule on a given day.
    #[must_use]
    pub const fn weekly(day: Weekday) -> Self {
        Self {
            schedule: ScheduleKind::Weekly,
            day: Some(day),
            hour: None,
        }
    }

    /// Monthly schedule.
    #[must_use]
    pub const fn monthly() -> Self {
        Self {
            schedule: ScheduleKind::Monthly,
            day: None,
            hour: None,
        }
    }

    /// Restrict to an hour of day.
    #[must_use]
    pub const fn at_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }
}

/// Period of a time-based trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    /// At most once per day
    Daily,
    /// At most once per week
    Weekly,
    /// At most once per calendar month
    Monthly,
}

/// Conditions for engagement triggers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementConditions {
    /// Metric to watch
    #[serde(default)]
    pub metric: Option<String>,
    /// Threshold value
    #[serde(default)]
    pub threshold: Option<f64>,
}
