//! JSON output formatting for contentops.

use serde::Serialize;
use serde_json::json;

use crate::error::ContentOpsError;

/// Format a list as `{"count": n, "items": [...]}`.
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn format_list_json<T: Serialize>(items: &[T]) -> Result<String, ContentOpsError> {
    let output = json!({
        "count": items.len(),
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `ContentOpsError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, ContentOpsError> {
    Ok(serde_json::to_string_pretty(value)?)
}
