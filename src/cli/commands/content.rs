//! Generated content listings.

use crate::cli::args::{NewslettersCommands, OutputFormat, PostsCommands};
use crate::error::ContentOpsError;
use crate::features::content::{NewsletterStorage, SocialPostStorage};
use crate::output::{format_campaigns, format_posts};

/// Execute post subcommands.
///
/// # Errors
///
/// Returns an error if the posts cannot be read.
pub fn posts(
    storage: &SocialPostStorage,
    cmd: PostsCommands,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match cmd {
        PostsCommands::List { limit } => format_posts(&storage.list(limit)?, format),
    }
}

/// Execute newsletter subcommands.
///
/// # Errors
///
/// Returns an error if the campaigns cannot be read.
pub fn newsletters(
    storage: &NewsletterStorage,
    cmd: NewslettersCommands,
    format: OutputFormat,
) -> Result<String, ContentOpsError> {
    match cmd {
        NewslettersCommands::List { limit } => format_campaigns(&storage.list(limit)?, format),
    }
}
