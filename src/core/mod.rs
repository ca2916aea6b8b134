//! Core abstractions for contentops.
//!
//! This module provides the storage collaborator traits and shared date
//! helpers used across features.

mod datetime;
mod traits;

pub use datetime::{calendar_months_between, format_short_date, local_today, whole_days_between};
pub use traits::{NewsletterRepository, RuleRepository, SocialPostRepository, TemplateRepository};

#[cfg(test)]
pub use traits::{MockNewsletterRepository, MockRuleRepository, MockSocialPostRepository, MockTemplateRepository};
