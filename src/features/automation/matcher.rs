//! Decides whether a rule should fire for a trigger.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use super::rule::{AutomationRule, BlogConditions, ScheduleKind, TimeSchedule, Trigger};
use super::trigger::TriggerPayload;
use crate::core::{calendar_months_between, whole_days_between};

/// Check a rule against a payload at `now`.
///
/// Manual payloads always match: the caller already picked the rule.
/// Otherwise the payload must be of the rule's trigger type and the rule's
/// conditions must hold.
#[must_use]
pub fn should_fire(rule: &AutomationRule, payload: &TriggerPayload, now: &DateTime<FixedOffset>) -> bool {
    match (&rule.trigger, payload) {
        (_, TriggerPayload::Manual(_)) => true,
        (Trigger::BlogPublished(conditions), TriggerPayload::BlogPublished(blog)) => {
            blog_matches(conditions, &blog.categories)
        }
        (Trigger::TimeBased(schedule), TriggerPayload::TimeBased(_)) => {
            schedule_due(schedule, rule.last_executed.as_ref(), now)
        }
        _ => false,
    }
}

/// Whether a blog with `categories` passes the rule's category filter.
#[must_use]
pub fn blog_matches(conditions: &BlogConditions, categories: &[String]) -> bool {
    conditions
        .blog_categories
        .as_ref()
        .map_or(true, |filter| filter.matches(categories))
}

/// Whether a time-based schedule is due at `now`.
///
/// A rule that never ran passes the elapsed checks. The hour check compares
/// the hour of `now` only, so a tick landing outside that hour misses the slot.
#[must_use]
pub fn schedule_due(
    schedule: &TimeSchedule,
    last_executed: Option<&DateTime<Utc>>,
    now: &DateTime<FixedOffset>,
) -> bool {
    let last = last_executed.map(|t| t.with_timezone(&now.timezone()));

    let period_elapsed = match schedule.schedule {
        ScheduleKind::Daily => last.map_or(true, |last| whole_days_between(&last, now) >= 1),
        ScheduleKind::Weekly => {
            if schedule.day.is_some_and(|day| day != now.weekday()) {
                return false;
            }
            last.map_or(true, |last| whole_days_between(&last, now) >= 7)
        }
        ScheduleKind::Monthly => {
            last.map_or(true, |last| calendar_months_between(&last, now) >= 1)
        }
    };
    if !period_elapsed {
        return false;
    }

    schedule.hour.map_or(true, |hour| now.hour() == hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automation::action::AutomationAction;
    use crate::features::automation::rule::{CategoryFilter, RuleType};
    use crate::features::automation::trigger::{
        BlogPublishedTrigger, EngagementThresholdTrigger, ManualTrigger, TimeBasedTrigger,
    };
    use chrono::{Duration, TimeZone, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().fixed_offset()
    }

    fn blog(categories: &[&str]) -> TriggerPayload {
        TriggerPayload::BlogPublished(BlogPublishedTrigger {
            title: "X".to_string(),
            url: "https://example.com/x".to_string(),
            content: String::new(),
            summary: None,
            author: None,
            categories: categories.iter().map(ToString::to_string).collect(),
            tags: Vec::new(),
            published_at: Utc::now(),
        })
    }

    fn rule(trigger: Trigger) -> AutomationRule {
        AutomationRule::new("Rule", RuleType::ContentGeneration, trigger)
            .with_action(AutomationAction::social_post(None))
    }

    fn tick(now: &DateTime<FixedOffset>) -> TriggerPayload {
        TriggerPayload::TimeBased(TimeBasedTrigger::at(now.with_timezone(&Utc)))
    }

    #[test]
    fn test_blog_all_categories() {
        let now = at(2024, 6, 3, 9);
        let all = rule(Trigger::BlogPublished(BlogConditions {
            blog_categories: Some(CategoryFilter::All),
        }));

        assert!(should_fire(&all, &blog(&["Anything"]), &now));
        assert!(should_fire(&all, &blog(&[]), &now));
        assert!(should_fire(&rule(Trigger::blog_published()), &blog(&["HR"]), &now));
    }

    #[test]
    fn test_blog_category_intersection() {
        let now = at(2024, 6, 3, 9);
        let tech = rule(Trigger::blog_published_in(vec!["Tech".to_string()]));

        assert!(should_fire(&tech, &blog(&["Tech", "HR"]), &now));
        assert!(!should_fire(&tech, &blog(&["HR"]), &now));
        assert!(!should_fire(&tech, &blog(&[]), &now));
    }

    #[test]
    fn test_weekly_monday_at_nine() {
        let schedule = TimeSchedule::weekly(Weekday::Mon).at_hour(9);
        // 2024-06-03 is a Monday
        let monday_nine = at(2024, 6, 3, 9);
        let weekly = rule(Trigger::time_based(schedule))
            .with_last_executed((monday_nine - Duration::days(8)).with_timezone(&Utc));

        assert!(should_fire(&weekly, &tick(&monday_nine), &monday_nine));

        let monday_ten = at(2024, 6, 3, 10);
        assert!(!should_fire(&weekly, &tick(&monday_ten), &monday_ten));

        let tuesday_nine = at(2024, 6, 4, 9);
        assert!(!should_fire(&weekly, &tick(&tuesday_nine), &tuesday_nine));
    }

    #[test]
    fn test_weekly_requires_seven_days() {
        let now = at(2024, 6, 3, 9);
        let weekly = rule(Trigger::time_based(TimeSchedule::weekly(Weekday::Mon)))
            .with_last_executed((now - Duration::days(6)).with_timezone(&Utc));

        assert!(!should_fire(&weekly, &tick(&now), &now));
    }

    #[test]
    fn test_monthly_same_month_rejected() {
        let now = at(2024, 3, 28, 12);
        let monthly = rule(Trigger::time_based(TimeSchedule::monthly()))
            .with_last_executed(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert!(!should_fire(&monthly, &tick(&now), &now));

        let next_month = at(2024, 4, 1, 0);
        assert!(should_fire(&monthly, &tick(&next_month), &next_month));
    }

    #[test]
    fn test_daily_whole_days() {
        let now = at(2024, 6, 3, 9);
        let daily = rule(Trigger::time_based(TimeSchedule::daily()));

        let recent = daily
            .clone()
            .with_last_executed((now - Duration::hours(23)).with_timezone(&Utc));
        assert!(!should_fire(&recent, &tick(&now), &now));

        let yesterday = daily
            .clone()
            .with_last_executed((now - Duration::hours(24)).with_timezone(&Utc));
        assert!(should_fire(&yesterday, &tick(&now), &now));

        assert!(should_fire(&daily, &tick(&now), &now));
    }

    #[test]
    fn test_mismatched_payloads() {
        let now = at(2024, 6, 3, 9);
        let daily = rule(Trigger::time_based(TimeSchedule::daily()));
        assert!(!should_fire(&daily, &blog(&["Tech"]), &now));

        let engagement = TriggerPayload::EngagementThreshold(EngagementThresholdTrigger {
            post_id: "p1".to_string(),
            metric: "likes".to_string(),
            value: 120.0,
            threshold: 100.0,
        });
        assert!(!should_fire(&rule(Trigger::blog_published()), &engagement, &now));
    }

    #[test]
    fn test_manual_always_fires() {
        let now = at(2024, 6, 3, 9);
        let tech = rule(Trigger::blog_published_in(vec!["Tech".to_string()]));
        let manual = TriggerPayload::Manual(ManualTrigger::default());

        assert!(should_fire(&tech, &manual, &now));
        assert!(should_fire(&rule(Trigger::Manual), &manual, &now));
    }
}
