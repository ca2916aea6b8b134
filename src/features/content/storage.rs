//! SQLite storage for generated content.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::types::{
    CampaignStatus, NewNewsletterCampaign, NewSocialPost, NewsletterCampaign, PostStatus, SocialPost,
};
use crate::core::{NewsletterRepository, SocialPostRepository};
use crate::error::ContentOpsError;
use crate::features::templates::Platform;
use crate::storage::{column_error, parse_timestamp, run_blocking, Database};

const POST_COLUMNS: &str = "id, platform, content, scheduled_at, status, created_at";
const CAMPAIGN_COLUMNS: &str = "id, subject, content, status, recipient_count, created_at";

/// Storage for social posts.
#[derive(Clone)]
pub struct SocialPostStorage {
    db: Arc<Database>,
}

impl SocialPostStorage {
    /// Create storage on a shared database.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert(&self, input: NewSocialPost) -> Result<SocialPost, ContentOpsError> {
        let post = SocialPost::from_new(input);
        let conn = self.db.connection()?;

        conn.execute(
            r"INSERT INTO social_posts (id, platform, content, scheduled_at, status, created_at)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                post.id,
                post.platform.as_str(),
                post.content,
                post.scheduled_at.map(|t| t.to_rfc3339()),
                post.status.as_str(),
                post.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| ContentOpsError::Database(format!("Failed to insert social post: {e}")))?;

        Ok(post)
    }

    /// Get a post by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, id: &str) -> Result<Option<SocialPost>, ContentOpsError> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT {POST_COLUMNS} FROM social_posts WHERE id = ?1");

        conn.query_row(&sql, [id], row_to_post)
            .optional()
            .map_err(|e| ContentOpsError::Database(format!("Failed to query social post: {e}")))
    }

    /// Most recent posts first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self, limit: usize) -> Result<Vec<SocialPost>, ContentOpsError> {
        let conn = self.db.connection()?;
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM social_posts ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ContentOpsError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([limit], row_to_post)
            .map_err(|e| ContentOpsError::Database(format!("Failed to query social posts: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ContentOpsError::Database(e.to_string()))
    }
}

#[async_trait]
impl SocialPostRepository for SocialPostStorage {
    async fn create(&self, input: NewSocialPost) -> Result<SocialPost, ContentOpsError> {
        let storage = self.clone();
        run_blocking(move || storage.insert(input)).await
    }
}

/// Storage for newsletter campaigns.
#[derive(Clone)]
pub struct NewsletterStorage {
    db: Arc<Database>,
}

impl NewsletterStorage {
    /// Create storage on a shared database.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert(&self, input: NewNewsletterCampaign) -> Result<NewsletterCampaign, ContentOpsError> {
        let campaign = NewsletterCampaign::from_new(input);
        let conn = self.db.connection()?;

        conn.execute(
            r"INSERT INTO newsletter_campaigns (id, subject, content, status, recipient_count, created_at)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                campaign.id,
                campaign.subject,
                campaign.content,
                campaign.status.as_str(),
                campaign.recipient_count,
                campaign.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| ContentOpsError::Database(format!("Failed to insert newsletter: {e}")))?;

        Ok(campaign)
    }

    /// Get a campaign by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, id: &str) -> Result<Option<NewsletterCampaign>, ContentOpsError> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM newsletter_campaigns WHERE id = ?1");

        conn.query_row(&sql, [id], row_to_campaign)
            .optional()
            .map_err(|e| ContentOpsError::Database(format!("Failed to query newsletter: {e}")))
    }

    /// Most recent campaigns first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self, limit: usize) -> Result<Vec<NewsletterCampaign>, ContentOpsError> {
        let conn = self.db.connection()?;
        let sql = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM newsletter_campaigns ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ContentOpsError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([limit], row_to_campaign)
            .map_err(|e| ContentOpsError::Database(format!("Failed to query newsletters: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ContentOpsError::Database(e.to_string()))
    }
}

#[async_trait]
impl NewsletterRepository for NewsletterStorage {
    async fn create(&self, input: NewNewsletterCampaign) -> Result<NewsletterCampaign, ContentOpsError> {
        let storage = self.clone();
        run_blocking(move || storage.insert(input)).await
    }
}

fn row_to_post(row: &Row<'_>) -> Result<SocialPost, rusqlite::Error> {
    let platform: String = row.get(1)?;
    let scheduled_at: Option<String> = row.get(3)?;
    let status: String = row.get(4)?;
    let created_at: String = row.get(5)?;

    Ok(SocialPost {
        id: row.get(0)?,
        platform: Platform::parse(&platform).map_err(|e| column_error(1, e))?,
        content: row.get(2)?,
        scheduled_at: scheduled_at.map(|s| parse_timestamp(3, &s)).transpose()?,
        status: PostStatus::parse(&status).map_err(|e| column_error(4, e))?,
        created_at: parse_timestamp(5, &created_at)?,
    })
}

fn row_to_campaign(row: &Row<'_>) -> Result<NewsletterCampaign, rusqlite::Error> {
    let status: String = row.get(3)?;
    let created_at: String = row.get(5)?;

    Ok(NewsletterCampaign {
        id: row.get(0)?,
        subject: row.get(1)?,
        content: row.get(2)?,
        status: CampaignStatus::parse(&status).map_err(|e| column_error(3, e))?,
        recipient_count: row.get(4)?,
        created_at: parse_timestamp(5, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn database() -> Arc<Database> {
        Arc::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_create_and_get_post() {
        let storage = SocialPostStorage::new(database());
        let scheduled = Utc::now() + Duration::hours(2);

        let post = storage
            .create(NewSocialPost {
                platform: Platform::Linkedin,
                content: "New article".to_string(),
                scheduled_at: Some(scheduled),
                status: PostStatus::Scheduled,
            })
            .await
            .unwrap();

        let loaded = storage.get(&post.id).unwrap().unwrap();
        assert_eq!(loaded.content, "New article");
        assert_eq!(loaded.status, PostStatus::Scheduled);
        assert_eq!(
            loaded.scheduled_at.unwrap().timestamp(),
            scheduled.timestamp()
        );
        assert!(storage.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_posts_limit() {
        let storage = SocialPostStorage::new(database());
        for i in 0..3 {
            storage
                .insert(NewSocialPost {
                    platform: Platform::Twitter,
                    content: format!("post {i}"),
                    scheduled_at: None,
                    status: PostStatus::Draft,
                })
                .unwrap();
        }

        assert_eq!(storage.list(2).unwrap().len(), 2);
        assert_eq!(storage.list(10).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_newsletter() {
        let storage = NewsletterStorage::new(database());
        let campaign = storage
            .create(NewNewsletterCampaign {
                subject: "Newsletter - 6/3/2024".to_string(),
                content: "Hello".to_string(),
                status: CampaignStatus::Draft,
                recipient_count: 0,
            })
            .await
            .unwrap();

        let loaded = storage.get(&campaign.id).unwrap().unwrap();
        assert_eq!(loaded.subject, "Newsletter - 6/3/2024");
        assert_eq!(loaded.recipient_count, 0);
        assert_eq!(storage.list(10).unwrap().len(), 1);
    }
}
