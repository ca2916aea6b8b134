//! contentops - a content automation engine
//!
//! Automation rules react to triggers (a published blog article, a
//! scheduled time, a manual request) and run actions that generate social
//! posts and newsletter campaigns from templates.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod logging;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use cli::commands::Services;
pub use error::ContentOpsError;
pub use features::automation::{AutomationEngine, AutomationScheduler};
