//! Automation engine for executing rules.
//!
//! The engine loads candidate rules for a trigger, asks the matcher whether
//! each should fire, runs the matching ones and records successful runs.
//! Entry points never fail: every problem is reported in the returned result.
//!
//! At most one execution per rule runs at a time. Batch entry points skip a
//! rule that is already running; manual runs report it as an error.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use super::executor::{ExecutionResult, RuleExecutor};
use super::matcher::should_fire;
use super::rule::{AutomationRule, TriggerType};
use super::trigger::{BlogPublishedTrigger, ManualTrigger, TimeBasedTrigger, TriggerPayload};
use crate::core::RuleRepository;
use crate::error::ContentOpsError;

/// Aggregate result of processing one trigger against many rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerProcessingResult {
    /// True when no rule reported an error
    pub success: bool,
    /// Number of rules that were executed
    pub executed_rules: usize,
    /// Per-rule results
    pub results: Vec<ExecutionResult>,
    /// Errors from every rule, prefixed with the rule name
    pub errors: Vec<String>,
}

impl TriggerProcessingResult {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            errors: vec![error],
            ..Self::default()
        }
    }
}

/// Rule IDs currently executing.
type InFlight = Arc<Mutex<HashSet<String>>>;

/// Marks a rule as executing until dropped.
struct ExecutionClaim {
    in_flight: InFlight,
    rule_id: String,
}

impl Drop for ExecutionClaim {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.rule_id);
    }
}

/// The automation engine.
pub struct AutomationEngine {
    rules: Arc<dyn RuleRepository>,
    executor: RuleExecutor,
    in_flight: InFlight,
}

impl AutomationEngine {
    /// Create an engine over a rule repository and executor.
    #[must_use]
    pub fn new(rules: Arc<dyn RuleRepository>, executor: RuleExecutor) -> Self {
        Self {
            rules,
            executor,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Run active blog-published rules whose categories match the article.
    #[instrument(skip(self, blog), fields(title = %blog.title))]
    pub async fn process_blog_published_trigger(&self, blog: BlogPublishedTrigger) -> TriggerProcessingResult {
        let now = Local::now().fixed_offset();
        let payload = TriggerPayload::BlogPublished(blog);
        self.process_batch(TriggerType::BlogPublished, &payload, &now).await
    }

    /// Run active time-based rules that are due now.
    pub async fn process_time_based_triggers(&self) -> TriggerProcessingResult {
        self.process_time_based_triggers_at(Local::now().fixed_offset()).await
    }

    /// Run active time-based rules that are due at `now`.
    #[instrument(skip(self, now), fields(now = %now))]
    pub async fn process_time_based_triggers_at(&self, now: DateTime<FixedOffset>) -> TriggerProcessingResult {
        let mut tick = TimeBasedTrigger::at(now.with_timezone(&Utc));
        tick.trigger_date = now.date_naive();
        let payload = TriggerPayload::TimeBased(tick);
        self.process_batch(TriggerType::TimeBased, &payload, &now).await
    }

    /// Run one rule by ID, bypassing its trigger conditions.
    #[instrument(skip(self, payload))]
    pub async fn process_manual_trigger(&self, rule_id: &str, payload: ManualTrigger) -> ExecutionResult {
        let rule = match self.rules.get_by_id(rule_id).await {
            Ok(Some(rule)) => rule,
            Ok(None) => return ExecutionResult::failure(rule_id, "Rule not found"),
            Err(e) => {
                error!(error = %e, "Failed to load rule");
                return ExecutionResult::failure(rule_id, format!("Failed to load rule: {e}"));
            }
        };

        if !rule.is_active {
            return ExecutionResult::failure(rule_id, "Rule is not active");
        }

        let Some(_claim) = self.try_claim(&rule.id) else {
            warn!(rule = %rule.name, "Rule is already executing");
            return ExecutionResult::failure(rule_id, "Rule is already executing");
        };

        self.run_rule(&rule, &TriggerPayload::Manual(payload)).await
    }

    /// Whether a rule is executing right now.
    #[must_use]
    pub fn is_executing(&self, rule_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(rule_id)
    }

    async fn process_batch(
        &self,
        trigger_type: TriggerType,
        payload: &TriggerPayload,
        now: &DateTime<FixedOffset>,
    ) -> TriggerProcessingResult {
        let rules = match self.rules.get_active_rules_by_trigger(trigger_type).await {
            Ok(rules) => rules,
            Err(e) => {
                error!(error = %e, trigger = trigger_type.as_str(), "Failed to load rules");
                return TriggerProcessingResult::failed(format!("Failed to load rules: {e}"));
            }
        };
        debug!(candidates = rules.len(), trigger = trigger_type.as_str(), "Loaded rules");

        let mut outcome = TriggerProcessingResult::default();
        for rule in rules {
            if !should_fire(&rule, payload, now) {
                debug!(rule = %rule.name, "Conditions not met");
                continue;
            }

            let Some(_claim) = self.try_claim(&rule.id) else {
                warn!(rule = %rule.name, "Rule is already executing, skipping");
                continue;
            };

            // The candidate list may predate a run that finished before the
            // claim, so schedules are checked again against the stored rule.
            let rule = if trigger_type == TriggerType::TimeBased {
                match self.reload_if_due(&rule, payload, now).await {
                    Ok(Some(fresh)) => fresh,
                    Ok(None) => continue,
                    Err(e) => {
                        error!(rule = %rule.name, error = %e, "Failed to reload rule");
                        outcome.errors.push(format!("Rule '{}': Failed to reload rule: {e}", rule.name));
                        continue;
                    }
                }
            } else {
                rule
            };

            let result = self.run_rule(&rule, payload).await;
            outcome
                .errors
                .extend(result.errors.iter().map(|e| format!("Rule '{}': {e}", rule.name)));
            outcome.executed_rules += 1;
            outcome.results.push(result);
        }

        outcome.success = outcome.errors.is_empty();
        info!(
            trigger = trigger_type.as_str(),
            executed = outcome.executed_rules,
            errors = outcome.errors.len(),
            "Trigger processed"
        );
        outcome
    }

    /// Re-read a claimed rule and check that it is still active and due.
    async fn reload_if_due(
        &self,
        rule: &AutomationRule,
        payload: &TriggerPayload,
        now: &DateTime<FixedOffset>,
    ) -> Result<Option<AutomationRule>, ContentOpsError> {
        let Some(fresh) = self.rules.get_by_id(&rule.id).await? else {
            debug!(rule = %rule.name, "Rule deleted before it ran");
            return Ok(None);
        };
        if !fresh.is_active || !should_fire(&fresh, payload, now) {
            debug!(rule = %rule.name, "Rule no longer due");
            return Ok(None);
        }
        Ok(Some(fresh))
    }

    /// Execute a claimed rule and record the run if every action succeeded.
    async fn run_rule(&self, rule: &AutomationRule, payload: &TriggerPayload) -> ExecutionResult {
        let mut result = self.executor.execute(rule, payload).await;

        if result.success {
            match self.rules.update_execution(&rule.id).await {
                Ok(()) => debug!(rule = %rule.name, "Recorded execution"),
                Err(e) => {
                    error!(rule = %rule.name, error = %e, "Failed to record execution");
                    result.errors.push(format!("Failed to update execution: {e}"));
                    result.success = false;
                }
            }
        } else {
            warn!(rule = %rule.name, errors = result.errors.len(), "Rule finished with errors");
        }

        result
    }

    fn try_claim(&self, rule_id: &str) -> Option<ExecutionClaim> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(rule_id.to_string()) {
            return None;
        }
        Some(ExecutionClaim {
            in_flight: Arc::clone(&self.in_flight),
            rule_id: rule_id.to_string(),
        })
    }
}
