//! Content produced by automation rules.
//!
//! Social posts and newsletter campaigns are created by the action
//! executors and listed from the CLI.

mod storage;
mod types;

pub use storage::{NewsletterStorage, SocialPostStorage};
pub use types::{
    CampaignStatus, NewNewsletterCampaign, NewSocialPost, NewsletterCampaign, PostStatus, SocialPost,
};
