use crate::error::Result;
use crate::models::content::ContentRecord;

pub mod sqlite;

/// Unified data-access trait. Every database operation goes through here.
/// Implementation: `SqliteStore` (wraps rusqlite/r2d2).
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<()>;
    fn seed_defaults(&self) -> Result<()>;

    // ── Settings ────────────────────────────────────────────────────
    fn setting_get(&self, key: &str) -> Result<Option<String>>;
    fn setting_get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .setting_get(key)?
            .unwrap_or_else(|| default.to_string()))
    }
    fn setting_get_bool(&self, key: &str) -> Result<bool> {
        Ok(self
            .setting_get(key)?
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false))
    }
    fn setting_set(&self, key: &str, value: &str) -> Result<()>;

    // ── Contents ────────────────────────────────────────────────────
    fn content_get(&self, code: &str) -> Result<Option<ContentRecord>>;
    fn content_upsert(&self, code: &str, title: &str, url: &str) -> Result<ContentRecord>;
    fn content_delete(&self, code: &str) -> Result<bool>;
    fn content_recent(&self, limit: i64) -> Result<Vec<ContentRecord>>;
    fn content_top_by_views(&self, limit: i64) -> Result<Vec<ContentRecord>>;
    fn content_count(&self) -> Result<i64>;
    fn content_nth(&self, offset: i64) -> Result<Option<ContentRecord>>;
    fn content_increment_views(&self, code: &str) -> Result<Option<i64>>;
}
