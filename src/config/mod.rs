//! Configuration management for contentops.
//!
//! This module handles loading and saving configuration from the data root.

mod paths;
mod settings;

pub use paths::{Paths, HOME_ENV};
pub use settings::{AutomationConfig, ColorSetting, Config, DatabaseConfig, LogFormat, LoggingConfig};
