//! Storage layer for contentops.
//!
//! This module provides SQLite-based persistence shared by the rule,
//! template and content repositories.

mod database;
mod migrations;

pub use database::Database;
pub use migrations::CURRENT_VERSION;
pub(crate) use database::{column_error, parse_timestamp};

use crate::error::ContentOpsError;

/// Run a synchronous database call on tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ContentOpsError>
where
    F: FnOnce() -> Result<T, ContentOpsError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ContentOpsError::Database(format!("Database task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_blocking() {
        let value = run_blocking(|| Ok(42)).await.unwrap();
        assert_eq!(value, 42);

        let err = run_blocking::<(), _>(|| Err(ContentOpsError::Database("locked".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), ContentOpsError::Database("locked".to_string()).to_string());
    }
}
