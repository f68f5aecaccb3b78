use rand::Rng;
use std::sync::Arc;

use crate::error::{BotError, Result};
use crate::models::content::ContentRecord;
use crate::store::Store;

/// Platform share-path markers accepted in place of an http(s) scheme.
const SHARE_MARKERS: &[&str] = &["t.me/", "telegram.me/"];

const MAX_CODE_LEN: usize = 64;

/// Code → content table with view counters.
#[derive(Clone)]
pub struct ContentStore {
    store: Arc<dyn Store>,
}

impl ContentStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Insert or replace the record for `code`. Overwriting keeps the
    /// existing view counter.
    pub fn upsert(&self, code: &str, title: &str, url: &str) -> Result<ContentRecord> {
        let code = validate_code(code)?;
        let url = url.trim();
        if !is_content_url(url) {
            return Err(BotError::Validation(format!(
                "'{}' is not a content link",
                url
            )));
        }
        self.store.content_upsert(code, title.trim(), url)
    }

    pub fn get(&self, code: &str) -> Result<ContentRecord> {
        let code = code.trim();
        self.store
            .content_get(code)?
            .ok_or_else(|| BotError::NotFound(code.to_string()))
    }

    pub fn delete(&self, code: &str) -> Result<bool> {
        self.store.content_delete(code.trim())
    }

    pub fn list_recent(&self, limit: i64) -> Result<Vec<ContentRecord>> {
        self.store.content_recent(limit.max(0))
    }

    pub fn top_by_views(&self, limit: i64) -> Result<Vec<ContentRecord>> {
        self.store.content_top_by_views(limit.max(0))
    }

    pub fn count(&self) -> Result<i64> {
        self.store.content_count()
    }

    /// Uniform pick over all stored records.
    pub fn random_pick(&self) -> Result<ContentRecord> {
        let total = self.store.content_count()?;
        if total <= 0 {
            return Err(BotError::NotFound("no content stored".into()));
        }
        let offset = rand::thread_rng().gen_range(0..total);
        // A concurrent delete can shrink the table between the two queries.
        self.store
            .content_nth(offset)?
            .ok_or_else(|| BotError::NotFound("no content stored".into()))
    }

    /// Returns the new view count.
    pub fn increment_view(&self, code: &str) -> Result<i64> {
        let code = code.trim();
        self.store
            .content_increment_views(code)?
            .ok_or_else(|| BotError::NotFound(code.to_string()))
    }
}

fn validate_code(code: &str) -> Result<&str> {
    let code = code.trim();
    if code.is_empty() {
        return Err(BotError::Validation("code must not be empty".into()));
    }
    if code.chars().count() > MAX_CODE_LEN {
        return Err(BotError::Validation(format!(
            "code is longer than {} characters",
            MAX_CODE_LEN
        )));
    }
    Ok(code)
}

/// An http(s) link, or a bare share path such as `t.me/channel/12`.
pub fn is_content_url(url: &str) -> bool {
    if url.starts_with("http://") || url.starts_with("https://") {
        return true;
    }
    let path = url.strip_prefix("//").unwrap_or(url);
    SHARE_MARKERS.iter().any(|m| path.starts_with(m))
}
