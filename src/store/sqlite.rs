use crate::db::DbPool;
use crate::error::Result;
use crate::models::content::ContentRecord;
use crate::models::settings::Setting;

use super::Store;

/// SQLite-backed implementation of the Store trait.
/// Wraps the r2d2 connection pool and delegates to model methods.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new_at(path: &str) -> Result<Self> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<()> {
        crate::db::run_migrations(&self.pool)
    }

    fn seed_defaults(&self) -> Result<()> {
        crate::db::seed_defaults(&self.pool)
    }

    // ── Settings ────────────────────────────────────────────────────

    fn setting_get(&self, key: &str) -> Result<Option<String>> {
        Setting::get(&self.pool, key)
    }

    fn setting_set(&self, key: &str, value: &str) -> Result<()> {
        Setting::set(&self.pool, key, value)
    }

    // ── Contents ────────────────────────────────────────────────────

    fn content_get(&self, code: &str) -> Result<Option<ContentRecord>> {
        ContentRecord::find_by_code(&self.pool, code)
    }

    fn content_upsert(&self, code: &str, title: &str, url: &str) -> Result<ContentRecord> {
        ContentRecord::upsert(&self.pool, code, title, url)
    }

    fn content_delete(&self, code: &str) -> Result<bool> {
        ContentRecord::delete(&self.pool, code)
    }

    fn content_recent(&self, limit: i64) -> Result<Vec<ContentRecord>> {
        ContentRecord::recent(&self.pool, limit)
    }

    fn content_top_by_views(&self, limit: i64) -> Result<Vec<ContentRecord>> {
        ContentRecord::top_by_views(&self.pool, limit)
    }

    fn content_count(&self) -> Result<i64> {
        ContentRecord::count(&self.pool)
    }

    fn content_nth(&self, offset: i64) -> Result<Option<ContentRecord>> {
        ContentRecord::nth(&self.pool, offset)
    }

    fn content_increment_views(&self, code: &str) -> Result<Option<i64>> {
        ContentRecord::increment_views(&self.pool, code)
    }
}
