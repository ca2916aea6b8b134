//! Feature implementations for contentops.
//!
//! - Automation rules, triggers, executors and the scheduler
//! - Content templates and rendering
//! - Generated content (social posts, newsletter campaigns)

pub mod automation;
pub mod content;
pub mod templates;
