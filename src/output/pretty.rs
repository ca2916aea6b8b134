use colored::Colorize;

use crate::features::automation::{
    ActionOutput, AutomationAction, AutomationRule, CategoryFilter, ExecutionResult, ScheduleKind,
    Trigger, TriggerProcessingResult,
};
use crate::features::content::{NewsletterCampaign, PostStatus, SocialPost};
use crate::features::templates::ContentTemplate;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One-line description of a trigger and its conditions.
pub fn describe_trigger(trigger: &Trigger) -> String {
    match trigger {
        Trigger::BlogPublished(conditions) => match &conditions.blog_categories {
            None | Some(CategoryFilter::All) => "Blog published (all categories)".to_string(),
            Some(CategoryFilter::Only(categories)) => {
                format!("Blog published in {}", categories.join(", "))
            }
        }
        Trigger::TimeBased(schedule) => {
            let mut text = match schedule.schedule {
                ScheduleKind::Daily => "Daily".to_string(),
                ScheduleKind::Weekly => match schedule.day {
                    Some(day) => format!("Weekly on {day}"),
                    None => "Weekly".to_string(),
                }
                ScheduleKind::Monthly => "Monthly".to_string(),
            };
            if let Some(hour) = schedule.hour {
                text.push_str(&format!(" at {hour:02}:00"));
            }
            text
        }
        Trigger::EngagementThreshold(conditions) => match (&conditions.metric, conditions.threshold) {
            (Some(metric), Some(threshold)) => format!("Engagement: {metric} >= {threshold}"),
            _ => "Engagement threshold".to_string(),
        }
        Trigger::Manual => "Manual".to_string(),
    }
}

fn describe_action(action: &AutomationAction) -> String {
    match action {
        AutomationAction::GenerateSocialPost {
            platform,
            template_id,
            schedule_delay_hours,
            auto_publish,
        } => {
            let mut parts = Vec::new();
            if let Some(platform) = platform {
                parts.push(platform.display_name().to_string());
            }
            if let Some(id) = template_id {
                parts.push(format!("template {id}"));
            }
            if let Some(hours) = schedule_delay_hours {
                parts.push(format!("+{hours}h"));
            }
            if *auto_publish {
                parts.push("auto-publish".to_string());
            }
            with_details(action.display_name(), &parts)
        }
        AutomationAction::GenerateNewsletter {
            template_id,
            auto_send,
            ..
        } => {
            let mut parts = Vec::new();
            if let Some(id) = template_id {
                parts.push(format!("template {id}"));
            }
            if *auto_send {
                parts.push("auto-send".to_string());
            }
            with_details(action.display_name(), &parts)
        }
        AutomationAction::OptimizePostingTime { platforms } => {
            let names: Vec<String> = platforms.iter().map(|p| p.display_name().to_string()).collect();
            with_details(action.display_name(), &names)
        }
        AutomationAction::SendNotification { recipients, .. } => {
            with_details(action.display_name(), recipients)
        }
        AutomationAction::UpdateAnalytics => action.display_name().to_string(),
    }
}

fn with_details(name: &str, parts: &[String]) -> String {
    if parts.is_empty() {
        name.to_string()
    } else {
        format!("{name} ({})", parts.join(", "))
    }
}

/// Format a list of rules.
pub fn format_rules_pretty(rules: &[AutomationRule]) -> String {
    if rules.is_empty() {
        return "No automation rules defined.\n\nAdd one with: contentops rules add <file>".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("{} ({})", "Automation Rules".bold(), rules.len()));
    lines.push("═".repeat(60));

    for rule in rules {
        let status = if rule.is_active { "✓".green() } else { "○".dimmed() };
        lines.push(format!("{} {}  {}", status, rule.name.bold(), rule.id.dimmed()));

        if let Some(desc) = &rule.description {
            lines.push(format!("    {}", desc.dimmed()));
        }

        lines.push(format!(
            "    {} | {} actions | priority {}",
            describe_trigger(&rule.trigger),
            rule.actions.len(),
            rule.priority
        ));

        if rule.execution_count > 0 {
            let last = rule
                .last_executed
                .map_or_else(|| "never".to_string(), |t| t.format(DATE_FORMAT).to_string());
            lines.push(format!("    Runs: {} | Last: {}", rule.execution_count, last));
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

/// Format a single rule with its actions.
pub fn format_rule_pretty(rule: &AutomationRule) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Rule: {}", rule.name.bold()));
    lines.push("═".repeat(50));
    lines.push(format!("{}: {}", "ID".dimmed(), rule.id));
    if let Some(desc) = &rule.description {
        lines.push(format!("{}: {desc}", "Description".dimmed()));
    }
    lines.push(format!("{}: {}", "Type".dimmed(), rule.rule_type.display_name()));
    lines.push(format!(
        "{}: {}",
        "Status".dimmed(),
        if rule.is_active { "Active".green() } else { "Inactive".yellow() }
    ));
    lines.push(format!("{}: {}", "Priority".dimmed(), rule.priority));
    lines.push(format!("{}: {}", "Trigger".dimmed(), describe_trigger(&rule.trigger)));
    lines.push(String::new());

    lines.push("Actions".to_string());
    lines.push("─".repeat(40));
    if rule.actions.is_empty() {
        lines.push("  (none)".dimmed().to_string());
    }
    for (i, action) in rule.actions.iter().enumerate() {
        lines.push(format!("  {}. {}", i + 1, describe_action(action)));
    }
    lines.push(String::new());

    lines.push(format!("{}: {}", "Executions".dimmed(), rule.execution_count));
    if let Some(last) = rule.last_executed {
        lines.push(format!("{}: {}", "Last executed".dimmed(), last.format(DATE_FORMAT)));
    }
    lines.push(format!("{}: {}", "Created".dimmed(), rule.created_at.format(DATE_FORMAT)));

    lines.join("\n")
}

/// Format a list of templates.
pub fn format_templates_pretty(templates: &[ContentTemplate]) -> String {
    if templates.is_empty() {
        return "No templates found.\n\nSeed the defaults with: contentops templates seed".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("{} ({})", "Templates".bold(), templates.len()));
    lines.push("═".repeat(60));

    for template in templates {
        let status = if template.is_active { "✓".green() } else { "○".dimmed() };
        lines.push(format!(
            "{} {}  {} / {}",
            status,
            template.name.bold(),
            template.template_type.as_str().cyan(),
            template.platform.as_str().cyan()
        ));
        lines.push(format!("    {}", template.id.dimmed()));
        if let Some(desc) = &template.description {
            lines.push(format!("    {desc}"));
        }
    }

    lines.join("\n")
}

/// Format a single template with its body.
pub fn format_template_pretty(template: &ContentTemplate) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Template: {}", template.name.bold()));
    lines.push("═".repeat(50));
    lines.push(format!("{}: {}", "ID".dimmed(), template.id));
    if let Some(desc) = &template.description {
        lines.push(format!("{}: {desc}", "Description".dimmed()));
    }
    lines.push(format!("{}: {}", "Type".dimmed(), template.template_type.as_str()));
    lines.push(format!("{}: {}", "Platform".dimmed(), template.platform.as_str()));
    lines.push(format!(
        "{}: {}",
        "Status".dimmed(),
        if template.is_active { "Active".green() } else { "Inactive".yellow() }
    ));
    if !template.variables.is_empty() {
        lines.push(format!("{}: {}", "Variables".dimmed(), template.variables.join(", ")));
    }
    lines.push(String::new());
    lines.push("─".repeat(40));
    lines.push(template.content_template.clone());

    lines.join("\n")
}

/// Format social posts, most recent first.
pub fn format_posts_pretty(posts: &[SocialPost]) -> String {
    if posts.is_empty() {
        return format!("{} (0)\n  No posts", "Social Posts".bold());
    }

    let mut lines = Vec::new();
    lines.push(format!("{} ({})", "Social Posts".bold(), posts.len()));
    lines.push("─".repeat(60));

    for post in posts {
        let status = match post.status {
            PostStatus::Draft => "draft".dimmed(),
            PostStatus::Scheduled => "scheduled".yellow(),
            PostStatus::Published => "published".green(),
        };
        let mut header = format!("{} [{}]  {}", post.platform.display_name().bold(), status, post.id.dimmed());
        if let Some(at) = post.scheduled_at {
            header.push_str(&format!("  {}", at.format(DATE_FORMAT).to_string().yellow()));
        }
        lines.push(header);
        for line in post.content.lines() {
            lines.push(format!("    {line}"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Format newsletter campaigns, most recent first.
pub fn format_campaigns_pretty(campaigns: &[NewsletterCampaign]) -> String {
    if campaigns.is_empty() {
        return format!("{} (0)\n  No campaigns", "Newsletter Campaigns".bold());
    }

    let mut lines = Vec::new();
    lines.push(format!("{} ({})", "Newsletter Campaigns".bold(), campaigns.len()));
    lines.push("─".repeat(60));

    for campaign in campaigns {
        lines.push(format!(
            "{} [{}]  {}",
            campaign.subject.bold(),
            campaign.status.as_str(),
            campaign.id.dimmed()
        ));
        lines.push(format!(
            "    {} | {} recipients",
            campaign.created_at.format(DATE_FORMAT),
            campaign.recipient_count
        ));
    }

    lines.join("\n")
}

fn describe_output(output: &ActionOutput) -> String {
    match output {
        ActionOutput::SocialPost { post_id, platform, .. } => {
            format!("{} post {post_id}", platform.display_name())
        }
        ActionOutput::Newsletter { campaign_id, subject, .. } => {
            format!("Newsletter \"{subject}\" {campaign_id}")
        }
        ActionOutput::PostingTimes { optimized_times, .. } => {
            let slots: Vec<String> = optimized_times
                .iter()
                .map(|s| format!("{} {} ({:.0})", s.platform.display_name(), s.datetime.format(DATE_FORMAT), s.engagement_score))
                .collect();
            format!("Suggested times: {}", slots.join(", "))
        }
        ActionOutput::Notification { notification_type, recipients } => {
            format!("{notification_type} notification to {}", recipients.join(", "))
        }
        ActionOutput::Analytics => "Analytics updated".to_string(),
    }
}

/// Format the outcome of one rule execution.
pub fn format_execution_pretty(result: &ExecutionResult) -> String {
    let mut lines = Vec::new();

    let icon = if result.success { "✓".green() } else { "✗".red() };
    lines.push(format!(
        "{} {}  {}",
        icon,
        result.rule_name.bold(),
        format!("{}ms", result.execution_time_ms).dimmed()
    ));

    for (i, action) in result.results.iter().enumerate() {
        let line = match (&action.output, &action.error) {
            (Some(output), _) => format!("    {}. {}", i + 1, describe_output(output)),
            (None, Some(error)) => format!("    {}. {}", i + 1, error.red()),
            (None, None) => format!("    {}. {}", i + 1, "no output".dimmed()),
        };
        lines.push(line);
    }

    for error in &result.errors {
        lines.push(format!("    {} {}", "!".red(), error));
    }

    lines.join("\n")
}

/// Format the outcome of processing a trigger.
pub fn format_processing_pretty(result: &TriggerProcessingResult) -> String {
    let mut lines = Vec::new();

    let summary = format!("Executed {} rules", result.executed_rules);
    if result.success {
        lines.push(summary.green().bold().to_string());
    } else {
        lines.push(format!("{} ({} errors)", summary.yellow().bold(), result.errors.len()));
    }

    if result.results.is_empty() && result.errors.is_empty() {
        lines.push("  No matching rules".dimmed().to_string());
    }

    for execution in &result.results {
        lines.push(format_execution_pretty(execution));
    }

    // Errors that did not come from an executed rule (e.g. rule loading)
    if result.results.is_empty() {
        for error in &result.errors {
            lines.push(format!("  {} {}", "!".red(), error));
        }
    }

    lines.join("\n")
}
