//! Scheduler command implementation.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cli::args::SchedulerCommands;
use crate::config::Config;
use crate::error::ContentOpsError;
use crate::features::automation::{AutomationEngine, AutomationScheduler};

/// Execute scheduler subcommands.
///
/// `run` blocks until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the scheduler cannot start or the signal handler
/// cannot be installed.
pub async fn scheduler(
    engine: Arc<AutomationEngine>,
    config: &Config,
    cmd: SchedulerCommands,
) -> Result<String, ContentOpsError> {
    match cmd {
        SchedulerCommands::Run { interval } => {
            let period = interval.map_or_else(
                || config.scheduler_interval(),
                |minutes| Duration::from_secs(minutes.max(1) * 60),
            );

            let mut scheduler = AutomationScheduler::new(engine, period);
            scheduler.start()?;
            println!(
                "Scheduler running every {} minutes. Press Ctrl-C to stop.",
                period.as_secs() / 60
            );

            let signal = tokio::signal::ctrl_c().await;
            info!("Stopping scheduler");
            scheduler.stop().await;
            signal?;

            Ok("Scheduler stopped".to_string())
        }
    }
}
