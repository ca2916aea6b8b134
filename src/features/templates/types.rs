//! Template data types.
//!
//! A content template is a string with `{{variable}}` placeholders that the
//! automation engine renders into social posts and newsletters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::render::extract_variables;
use crate::error::ContentOpsError;

/// Kind of content a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    /// Blog article body
    Blog,
    /// Social media post
    Social,
    /// Newsletter email
    Newsletter,
}

impl TemplateType {
    /// Stable storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Social => "social",
            Self::Newsletter => "newsletter",
        }
    }

    /// Parse a storage key.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys.
    pub fn parse(s: &str) -> Result<Self, ContentOpsError> {
        match s.to_lowercase().as_str() {
            "blog" => Ok(Self::Blog),
            "social" => Ok(Self::Social),
            "newsletter" => Ok(Self::Newsletter),
            _ => Err(ContentOpsError::Validation(format!("template type: {s}"))),
        }
    }
}

/// Social platform a post is published on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// LinkedIn
    #[default]
    Linkedin,
    /// Twitter / X
    Twitter,
}

impl Platform {
    /// Stable storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Linkedin => "LinkedIn",
            Self::Twitter => "Twitter",
        }
    }

    /// Parse a storage key.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown platforms.
    pub fn parse(s: &str) -> Result<Self, ContentOpsError> {
        match s.to_lowercase().as_str() {
            "linkedin" => Ok(Self::Linkedin),
            "twitter" | "x" => Ok(Self::Twitter),
            _ => Err(ContentOpsError::Validation(format!("platform: {s}"))),
        }
    }
}

/// Platform a template targets; `All` serves every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplatePlatform {
    /// LinkedIn only
    Linkedin,
    /// Twitter only
    Twitter,
    /// Any platform
    All,
}

impl TemplatePlatform {
    /// Stable storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
            Self::All => "all",
        }
    }

    /// Parse a storage key.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown platforms.
    pub fn parse(s: &str) -> Result<Self, ContentOpsError> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            other => Platform::parse(other).map(Self::from),
        }
    }

    /// Whether a template for this platform can serve `platform`.
    #[must_use]
    pub fn serves(&self, platform: Platform) -> bool {
        matches!(self, Self::All) || *self == Self::from(platform)
    }

    /// The single platform this targets, if any.
    #[must_use]
    pub const fn platform(&self) -> Option<Platform> {
        match self {
            Self::Linkedin => Some(Platform::Linkedin),
            Self::Twitter => Some(Platform::Twitter),
            Self::All => None,
        }
    }
}

impl From<Platform> for TemplatePlatform {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Linkedin => Self::Linkedin,
            Platform::Twitter => Self::Twitter,
        }
    }
}

/// A reusable content template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTemplate {
    /// Unique template ID.
    #[serde(default = "new_id")]
    pub id: String,
    /// Template name.
    pub name: String,
    /// Template description.
    #[serde(default)]
    pub description: Option<String>,
    /// Kind of content produced.
    pub template_type: TemplateType,
    /// Target platform.
    pub platform: TemplatePlatform,
    /// Body with `{{variable}}` placeholders.
    pub content_template: String,
    /// Declared variable names. Derived from the body when left empty.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Inactive templates are never selected automatically.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Creation time.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

const fn default_true() -> bool {
    true
}

impl ContentTemplate {
    /// Create a template, deriving `variables` from the body.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        template_type: TemplateType,
        platform: TemplatePlatform,
        content_template: impl Into<String>,
    ) -> Self {
        let content_template = content_template.into();
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.into(),
            description: None,
            template_type,
            platform,
            variables: extract_variables(&content_template),
            content_template,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the declared variables.
    #[must_use]
    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = variables;
        self
    }

    /// Fill in `variables` from the body if none were declared.
    pub fn normalize(&mut self) {
        if self.variables.is_empty() {
            self.variables = extract_variables(&self.content_template);
        }
    }

    /// Placeholders used in the body but missing from `variables`.
    #[must_use]
    pub fn undeclared_variables(&self) -> Vec<String> {
        extract_variables(&self.content_template)
            .into_iter()
            .filter(|name| !self.variables.contains(name))
            .collect()
    }

    /// Validate the template before saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or body is empty.
    pub fn validate(&self) -> Result<(), ContentOpsError> {
        if self.name.trim().is_empty() {
            return Err(ContentOpsError::Validation("template: name is empty".to_string()));
        }
        if self.content_template.trim().is_empty() {
            return Err(ContentOpsError::Validation(format!(
                "template '{}': content is empty",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_variables() {
        let template = ContentTemplate::new(
            "Announcement",
            TemplateType::Social,
            TemplatePlatform::Linkedin,
            "New post: {{title}} {{url}} #{{hashtags}} {{title}}",
        );

        assert_eq!(template.variables, vec!["title", "url", "hashtags"]);
        assert!(template.undeclared_variables().is_empty());
    }

    #[test]
    fn test_undeclared_variables() {
        let template = ContentTemplate::new(
            "Partial",
            TemplateType::Social,
            TemplatePlatform::All,
            "{{title}} by {{author}}",
        )
        .with_variables(vec!["title".to_string()]);

        assert_eq!(template.undeclared_variables(), vec!["author"]);
    }

    #[test]
    fn test_template_platform_serves() {
        assert!(TemplatePlatform::All.serves(Platform::Twitter));
        assert!(TemplatePlatform::Linkedin.serves(Platform::Linkedin));
        assert!(!TemplatePlatform::Linkedin.serves(Platform::Twitter));
        assert_eq!(TemplatePlatform::Twitter.platform(), Some(Platform::Twitter));
        assert_eq!(TemplatePlatform::All.platform(), None);
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(TemplateType::parse("Newsletter").unwrap(), TemplateType::Newsletter);
        assert_eq!(Platform::parse("x").unwrap(), Platform::Twitter);
        assert_eq!(TemplatePlatform::parse("all").unwrap(), TemplatePlatform::All);
        assert!(TemplatePlatform::parse("myspace").is_err());
    }

    #[test]
    fn test_validate() {
        let mut template =
            ContentTemplate::new("Empty", TemplateType::Blog, TemplatePlatform::All, "  ");
        assert!(template.validate().is_err());

        template.content_template = "{{title}}".to_string();
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = r"
name: Weekly
template_type: newsletter
platform: all
content_template: 'Week of {{week_date}}'
";
        let mut template: ContentTemplate = serde_yaml::from_str(yaml).unwrap();
        template.normalize();

        assert!(template.is_active);
        assert!(!template.id.is_empty());
        assert_eq!(template.variables, vec!["week_date"]);
    }
}
