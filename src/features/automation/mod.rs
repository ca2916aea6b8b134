//! Rule-based content automation.
//!
//! This module turns triggers (a published blog article, a scheduler tick,
//! a manual request) into generated content.
//!
//! Features:
//! - Rules pairing a typed trigger with an ordered list of actions
//! - Category filters for blog triggers, daily/weekly/monthly schedules
//! - Best-effort execution: every action runs even when an earlier one fails
//! - At most one in-flight execution per rule
//! - A background scheduler for time-based rules

pub mod action;
pub mod engine;
pub mod executor;
pub mod matcher;
pub mod rule;
pub mod scheduler;
pub mod storage;
pub mod trigger;

pub use action::{ActionOutput, ActionResult, AutomationAction, PostingSuggestion};
pub use engine::{AutomationEngine, TriggerProcessingResult};
pub use executor::{ActionExecutor, ExecutionResult, RuleExecutor, DEFAULT_MAX_ACTIONS};
pub use matcher::should_fire;
pub use rule::{
    AutomationRule, BlogConditions, CategoryFilter, EngagementConditions, RuleType, ScheduleKind,
    TimeSchedule, Trigger, TriggerType,
};
pub use scheduler::{AutomationScheduler, DEFAULT_INTERVAL};
pub use storage::{RuleSet, RuleStorage};
pub use trigger::{
    BlogPublishedTrigger, EngagementThresholdTrigger, ManualTrigger, TimeBasedTrigger, TriggerPayload,
};
