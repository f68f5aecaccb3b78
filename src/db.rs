use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::error::Result;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Default autopost times, also the fallback when a reconfiguration
/// leaves the set empty.
pub const DEFAULT_AUTOPOST_TIMES: &[&str] = &["09:00", "18:00", "21:00"];

pub fn init_pool_at(path: &str) -> Result<DbPool> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| crate::error::BotError::Storage(e.to_string()))?;
        }
    }

    // WAL + busy timeout: concurrent view increments queue up on the write
    // lock instead of failing with SQLITE_BUSY.
    let manager = SqliteConnectionManager::file(path).with_init(|c| {
        c.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
    });
    let pool = Pool::builder().max_size(10).build(manager)?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Code -> content table
        CREATE TABLE IF NOT EXISTS contents (
            id INTEGER PRIMARY KEY,
            code TEXT UNIQUE NOT NULL,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            views INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_contents_created ON contents(created_at);
        CREATE INDEX IF NOT EXISTS idx_contents_views ON contents(views);

        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );
        ",
    )?;

    Ok(())
}

pub fn default_settings() -> Vec<(&'static str, String)> {
    vec![
        ("force_channels", String::new()),
        ("post_channel", String::new()),
        ("autopost_times", DEFAULT_AUTOPOST_TIMES.join(",")),
        ("autopost_enabled", "false".to_string()),
    ]
}

pub fn seed_defaults(pool: &DbPool) -> Result<()> {
    let conn = pool.get()?;

    for (key, value) in default_settings() {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    Ok(())
}
