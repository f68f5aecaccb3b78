use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContentRecord {
    pub code: String,
    pub title: String,
    pub url: String,
    pub views: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ContentRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ContentRecord {
            code: row.get("code")?,
            title: row.get("title")?,
            url: row.get("url")?,
            views: row.get("views")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_code(pool: &DbPool, code: &str) -> Result<Option<Self>> {
        let conn = pool.get()?;
        let record = conn
            .query_row(
                "SELECT * FROM contents WHERE code = ?1",
                params![code],
                Self::from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Insert or overwrite. An overwrite keeps `views` and `created_at`.
    pub fn upsert(pool: &DbPool, code: &str, title: &str, url: &str) -> Result<Self> {
        let conn = pool.get()?;
        let now = Utc::now().naive_utc();
        let record = conn.query_row(
            "INSERT INTO contents (code, title, url, views, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)
             ON CONFLICT(code) DO UPDATE SET
                title = excluded.title,
                url = excluded.url,
                updated_at = excluded.updated_at
             RETURNING *",
            params![code, title, url, now],
            Self::from_row,
        )?;
        Ok(record)
    }

    pub fn delete(pool: &DbPool, code: &str) -> Result<bool> {
        let conn = pool.get()?;
        let removed = conn.execute("DELETE FROM contents WHERE code = ?1", params![code])?;
        Ok(removed > 0)
    }

    pub fn recent(pool: &DbPool, limit: i64) -> Result<Vec<Self>> {
        Self::query_list(
            pool,
            "SELECT * FROM contents ORDER BY created_at DESC, id DESC LIMIT ?1",
            limit,
        )
    }

    /// Most viewed first; equal view counts rank the newer record higher.
    pub fn top_by_views(pool: &DbPool, limit: i64) -> Result<Vec<Self>> {
        Self::query_list(
            pool,
            "SELECT * FROM contents ORDER BY views DESC, created_at DESC, id DESC LIMIT ?1",
            limit,
        )
    }

    pub fn count(pool: &DbPool) -> Result<i64> {
        let conn = pool.get()?;
        let n = conn.query_row("SELECT COUNT(*) FROM contents", [], |row| row.get(0))?;
        Ok(n)
    }

    /// Record at position `offset` in insertion order.
    pub fn nth(pool: &DbPool, offset: i64) -> Result<Option<Self>> {
        let conn = pool.get()?;
        let record = conn
            .query_row(
                "SELECT * FROM contents ORDER BY id LIMIT 1 OFFSET ?1",
                params![offset],
                Self::from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Single-statement increment; returns the new count, or `None` for an
    /// unknown code.
    pub fn increment_views(pool: &DbPool, code: &str) -> Result<Option<i64>> {
        let conn = pool.get()?;
        let views = conn
            .query_row(
                "UPDATE contents SET views = views + 1 WHERE code = ?1 RETURNING views",
                params![code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(views)
    }

    fn query_list(pool: &DbPool, sql: &str, limit: i64) -> Result<Vec<Self>> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![limit], Self::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
