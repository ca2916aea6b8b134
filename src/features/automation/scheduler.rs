//! Periodic runner for time-based rules.
//!
//! The scheduler owns a background task that calls
//! `AutomationEngine::process_time_based_triggers` once per interval. Each
//! tick runs in its own task so a panicking tick is logged and the loop
//! keeps going.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use super::engine::AutomationEngine;
use crate::error::ContentOpsError;

/// Default tick period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Background scheduler for time-based rules.
pub struct AutomationScheduler {
    engine: Arc<AutomationEngine>,
    period: Duration,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AutomationScheduler {
    /// Create a stopped scheduler ticking every `period`.
    #[must_use]
    pub const fn new(engine: Arc<AutomationEngine>, period: Duration) -> Self {
        Self {
            engine,
            period,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Whether the background task is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Start ticking. The first tick fires one period from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler is already running or the period is zero.
    pub fn start(&mut self) -> Result<(), ContentOpsError> {
        if self.is_running() {
            return Err(ContentOpsError::NotSupported("Scheduler is already running".to_string()));
        }
        if self.period.is_zero() {
            return Err(ContentOpsError::Config("Scheduler interval must be positive".to_string()));
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let engine = Arc::clone(&self.engine);
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let engine = Arc::clone(&engine);
                        let tick = tokio::spawn(async move {
                            engine.process_time_based_triggers().await
                        });
                        match tick.await {
                            Ok(outcome) if outcome.success => {
                                info!(executed = outcome.executed_rules, "Scheduled run finished");
                            }
                            Ok(outcome) => {
                                warn!(
                                    executed = outcome.executed_rules,
                                    errors = ?outcome.errors,
                                    "Scheduled run finished with errors"
                                );
                            }
                            Err(e) => error!(error = %e, "Scheduled run aborted"),
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("Scheduler shutdown requested");
                        break;
                    }
                }
            }
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.handle = Some(handle);
        info!(interval_secs = period.as_secs(), "Scheduler started");
        Ok(())
    }

    /// Stop ticking and wait for the background task to finish.
    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Error waiting for scheduler to stop");
            }
        }

        info!("Scheduler stopped");
    }
}
