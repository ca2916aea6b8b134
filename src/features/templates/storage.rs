//! Template storage and persistence.
//!
//! Templates live in the `content_templates` table of the shared database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::types::{ContentTemplate, Platform, TemplatePlatform, TemplateType};
use crate::core::TemplateRepository;
use crate::error::ContentOpsError;
use crate::storage::{column_error, parse_timestamp, run_blocking, Database};

const COLUMNS: &str = "id, name, description, template_type, platform, content_template, \
                       variables_json, is_active, created_at, updated_at";

/// Manages template storage in the database.
#[derive(Clone)]
pub struct TemplateStorage {
    db: Arc<Database>,
}

impl TemplateStorage {
    /// Create template storage on a shared database.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or replace a template.
    ///
    /// Variables are derived from the body when none are declared.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is invalid or cannot be written.
    pub fn save(&self, template: &ContentTemplate) -> Result<ContentTemplate, ContentOpsError> {
        let mut template = template.clone();
        template.normalize();
        template.validate()?;
        template.updated_at = Utc::now();

        let variables = serde_json::to_string(&template.variables)?;
        let conn = self.db.connection()?;

        conn.execute(
            r"INSERT INTO content_templates
              (id, name, description, template_type, platform, content_template,
               variables_json, is_active, created_at, updated_at)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
              ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                template_type = excluded.template_type,
                platform = excluded.platform,
                content_template = excluded.content_template,
                variables_json = excluded.variables_json,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at",
            params![
                template.id,
                template.name,
                template.description,
                template.template_type.as_str(),
                template.platform.as_str(),
                template.content_template,
                variables,
                template.is_active,
                template.created_at.to_rfc3339(),
                template.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| ContentOpsError::Database(format!("Failed to save template: {e}")))?;

        Ok(template)
    }

    /// Get a template by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, id: &str) -> Result<Option<ContentTemplate>, ContentOpsError> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT {COLUMNS} FROM content_templates WHERE id = ?1");

        conn.query_row(&sql, [id], row_to_template)
            .optional()
            .map_err(|e| ContentOpsError::Database(format!("Failed to query template: {e}")))
    }

    /// List all templates by type, then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self) -> Result<Vec<ContentTemplate>, ContentOpsError> {
        let sql = format!("SELECT {COLUMNS} FROM content_templates ORDER BY template_type, name");
        self.query(&sql, [])
    }

    /// Active templates of a type serving `platform`.
    ///
    /// Exact platform matches come before `all` templates; ties sort by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find(
        &self,
        template_type: TemplateType,
        platform: Option<Platform>,
    ) -> Result<Vec<ContentTemplate>, ContentOpsError> {
        match platform {
            Some(platform) => {
                let sql = format!(
                    "SELECT {COLUMNS} FROM content_templates
                     WHERE template_type = ?1 AND is_active = 1
                       AND (platform = ?2 OR platform = ?3)
                     ORDER BY CASE WHEN platform = ?2 THEN 0 ELSE 1 END, name"
                );
                self.query(
                    &sql,
                    [
                        template_type.as_str(),
                        platform.as_str(),
                        TemplatePlatform::All.as_str(),
                    ],
                )
            }
            None => {
                let sql = format!(
                    "SELECT {COLUMNS} FROM content_templates
                     WHERE template_type = ?1 AND is_active = 1
                     ORDER BY name"
                );
                self.query(&sql, [template_type.as_str()])
            }
        }
    }

    /// Delete a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, id: &str) -> Result<bool, ContentOpsError> {
        let conn = self.db.connection()?;
        let rows = conn
            .execute("DELETE FROM content_templates WHERE id = ?1", [id])
            .map_err(|e| ContentOpsError::Database(format!("Failed to delete template: {e}")))?;

        Ok(rows > 0)
    }

    /// Insert the built-in templates that are not stored yet.
    ///
    /// Returns the number of templates inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if a template cannot be written.
    pub fn seed_defaults(&self) -> Result<usize, ContentOpsError> {
        let mut inserted = 0;
        for template in default_templates() {
            if self.get(&template.id)?.is_none() {
                self.save(&template)?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn query<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<ContentTemplate>, ContentOpsError> {
        let conn = self.db.connection()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ContentOpsError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(params, row_to_template)
            .map_err(|e| ContentOpsError::Database(format!("Failed to query templates: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ContentOpsError::Database(e.to_string()))
    }
}

#[async_trait]
impl TemplateRepository for TemplateStorage {
    async fn get_by_id(&self, id: &str) -> Result<Option<ContentTemplate>, ContentOpsError> {
        let (storage, id) = (self.clone(), id.to_string());
        run_blocking(move || storage.get(&id)).await
    }

    async fn get_by_type_and_platform(
        &self,
        template_type: TemplateType,
        platform: Option<Platform>,
    ) -> Result<Vec<ContentTemplate>, ContentOpsError> {
        let storage = self.clone();
        run_blocking(move || storage.find(template_type, platform)).await
    }
}

/// Built-in templates installed by `templates seed`.
#[must_use]
pub fn default_templates() -> Vec<ContentTemplate> {
    vec![
        ContentTemplate::new(
            "LinkedIn blog announcement",
            TemplateType::Social,
            TemplatePlatform::Linkedin,
            "New on the blog: {{title}}\n\n{{summary}}\n\nKey takeaways:\n{{key_points}}\n\n\
             Read more: {{url}}\n\n#{{hashtags}}",
        )
        .with_id("default-linkedin-blog")
        .with_description("Long-form announcement for new articles"),
        ContentTemplate::new(
            "Twitter blog announcement",
            TemplateType::Social,
            TemplatePlatform::Twitter,
            "{{title}} {{url}} #{{hashtags}}",
        )
        .with_id("default-twitter-blog")
        .with_description("Short announcement for new articles"),
        ContentTemplate::new(
            "Weekly newsletter",
            TemplateType::Newsletter,
            TemplatePlatform::All,
            "Weekly update - {{week_date}}\n\n{{recent_posts}}\n\n{{social_highlights}}",
        )
        .with_id("default-weekly-newsletter")
        .with_description("Weekly roundup"),
    ]
}

fn row_to_template(row: &Row<'_>) -> Result<ContentTemplate, rusqlite::Error> {
    let template_type: String = row.get(3)?;
    let platform: String = row.get(4)?;
    let variables: String = row.get(6)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(ContentTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        template_type: TemplateType::parse(&template_type).map_err(|e| column_error(3, e))?,
        platform: TemplatePlatform::parse(&platform).map_err(|e| column_error(4, e))?,
        content_template: row.get(5)?,
        variables: serde_json::from_str(&variables).map_err(|e| column_error(6, e))?,
        is_active: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
        updated_at: parse_timestamp(9, &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> TemplateStorage {
        TemplateStorage::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn social(name: &str, platform: TemplatePlatform) -> ContentTemplate {
        ContentTemplate::new(name, TemplateType::Social, platform, "{{title}}")
    }

    #[test]
    fn test_save_and_get() {
        let storage = create_test_storage();
        let template = ContentTemplate::new(
            "Announcement",
            TemplateType::Social,
            TemplatePlatform::Linkedin,
            "New: {{title}} {{url}}",
        )
        .with_variables(Vec::new());

        let saved = storage.save(&template).unwrap();
        assert_eq!(saved.variables, vec!["title", "url"]);

        let loaded = storage.get(&template.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Announcement");
        assert_eq!(loaded.variables, vec!["title", "url"]);
        assert_eq!(loaded.platform, TemplatePlatform::Linkedin);
    }

    #[test]
    fn test_save_updates_existing() {
        let storage = create_test_storage();
        let mut template = social("First", TemplatePlatform::Twitter);
        storage.save(&template).unwrap();

        template.name = "Renamed".to_string();
        storage.save(&template).unwrap();

        assert_eq!(storage.list().unwrap().len(), 1);
        assert_eq!(storage.get(&template.id).unwrap().unwrap().name, "Renamed");
    }

    #[test]
    fn test_save_rejects_empty_body() {
        let storage = create_test_storage();
        let template = ContentTemplate::new("Empty", TemplateType::Blog, TemplatePlatform::All, "  ");
        assert!(storage.save(&template).is_err());
    }

    #[test]
    fn test_find_prefers_exact_platform() {
        let storage = create_test_storage();
        storage.save(&social("A generic", TemplatePlatform::All)).unwrap();
        storage.save(&social("Z linkedin", TemplatePlatform::Linkedin)).unwrap();
        storage.save(&social("Twitter only", TemplatePlatform::Twitter)).unwrap();

        let mut inactive = social("B inactive", TemplatePlatform::Linkedin);
        inactive.is_active = false;
        storage.save(&inactive).unwrap();

        let found = storage
            .find(TemplateType::Social, Some(Platform::Linkedin))
            .unwrap();
        let names: Vec<_> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Z linkedin", "A generic"]);

        assert_eq!(storage.find(TemplateType::Social, None).unwrap().len(), 3);
        assert!(storage.find(TemplateType::Newsletter, None).unwrap().is_empty());
    }

    #[test]
    fn test_seed_defaults_is_idempotent() {
        let storage = create_test_storage();
        assert_eq!(storage.seed_defaults().unwrap(), 3);
        assert_eq!(storage.seed_defaults().unwrap(), 0);
        assert_eq!(storage.list().unwrap().len(), 3);
    }

    #[test]
    fn test_delete() {
        let storage = create_test_storage();
        let template = social("Gone", TemplatePlatform::All);
        storage.save(&template).unwrap();

        assert!(storage.delete(&template.id).unwrap());
        assert!(!storage.delete(&template.id).unwrap());
    }
}
