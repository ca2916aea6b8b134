//! Database migrations for contentops.
//!
//! Each migration upgrades the schema by one version, tracked in
//! `PRAGMA user_version`. Migrations run when the database is opened.

use rusqlite::Connection;

use crate::error::ContentOpsError;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Get the current schema version from the database.
///
/// Returns 0 for a new database.
pub fn get_version(conn: &Connection) -> Result<i32, ContentOpsError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| ContentOpsError::Database(format!("Failed to get schema version: {e}")))
}

fn set_version(conn: &Connection, version: i32) -> Result<(), ContentOpsError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| ContentOpsError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), ContentOpsError> {
    let current = get_version(conn)?;

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

fn run_migration(conn: &Connection, version: i32) -> Result<(), ContentOpsError> {
    match version {
        1 => migrate_v1(conn),
        2 => migrate_v2(conn),
        _ => Err(ContentOpsError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: rules and templates.
fn migrate_v1(conn: &Connection) -> Result<(), ContentOpsError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS automation_rules (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            rule_type TEXT NOT NULL,
            trigger_type TEXT NOT NULL,
            trigger_json TEXT NOT NULL,
            actions_json TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            priority INTEGER NOT NULL DEFAULT 100,
            execution_count INTEGER NOT NULL DEFAULT 0,
            last_executed TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_automation_rules_trigger
        ON automation_rules(trigger_type, is_active);

        CREATE TABLE IF NOT EXISTS content_templates (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            template_type TEXT NOT NULL,
            platform TEXT NOT NULL,
            content_template TEXT NOT NULL,
            variables_json TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_content_templates_type
        ON content_templates(template_type, platform);
        ",
    )
    .map_err(|e| ContentOpsError::Database(format!("Migration v1 failed: {e}")))
}

/// Migration v2: generated content.
fn migrate_v2(conn: &Connection) -> Result<(), ContentOpsError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS social_posts (
            id TEXT PRIMARY KEY,
            platform TEXT NOT NULL,
            content TEXT NOT NULL,
            scheduled_at TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_social_posts_status
        ON social_posts(status);

        CREATE TABLE IF NOT EXISTS newsletter_campaigns (
            id TEXT PRIMARY KEY,
            subject TEXT NOT NULL,
            content TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            recipient_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| ContentOpsError::Database(format!("Migration v2 failed: {e}")))
}
