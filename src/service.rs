use chrono::NaiveTime;
use serde::Serialize;
use std::sync::Arc;

use crate::admin::{format_time, AdminConfig};
use crate::content::ContentStore;
use crate::error::{BotError, Result};
use crate::gate::{GateDecision, SubscriptionGate};
use crate::models::content::ContentRecord;
use crate::tasks::ScheduleManager;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Lookup {
    /// Record as returned to the user, with the view already counted.
    Found { record: ContentRecord },
    Blocked { channels: Vec<String> },
    NotFound { code: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsSummary {
    pub force_channels: Vec<String>,
    pub post_channel: String,
    pub autopost_times: Vec<String>,
    pub autopost_enabled: bool,
    pub content_count: i64,
}

/// Inbound operation surface shared by the webhook and the JSON API.
#[derive(Clone)]
pub struct Service {
    pub admin: AdminConfig,
    pub content: ContentStore,
    pub gate: SubscriptionGate,
    pub schedule: Arc<ScheduleManager>,
}

impl Service {
    // ── User operations ─────────────────────────────────────────────

    pub fn lookup(&self, user_id: i64, code: &str) -> Result<Lookup> {
        if let GateDecision::Blocked(channels) = self.gate.evaluate(user_id)? {
            return Ok(Lookup::Blocked { channels });
        }

        let mut record = match self.content.get(code) {
            Ok(r) => r,
            Err(BotError::NotFound(code)) => return Ok(Lookup::NotFound { code }),
            Err(e) => return Err(e),
        };
        match self.content.increment_view(&record.code) {
            Ok(views) => record.views = views,
            // Deleted between the read and the increment.
            Err(BotError::NotFound(code)) => return Ok(Lookup::NotFound { code }),
            Err(e) => return Err(e),
        }
        Ok(Lookup::Found { record })
    }

    pub fn recheck(&self, user_id: i64) -> Result<GateDecision> {
        self.gate.evaluate(user_id)
    }

    pub fn list_recent(&self, limit: i64) -> Result<Vec<ContentRecord>> {
        self.content.list_recent(limit)
    }

    pub fn top_by_views(&self, limit: i64) -> Result<Vec<ContentRecord>> {
        self.content.top_by_views(limit)
    }

    // ── Admin operations ────────────────────────────────────────────

    pub fn add_content(
        &self,
        caller: i64,
        code: &str,
        title: &str,
        url: &str,
    ) -> Result<ContentRecord> {
        self.admin.authorize(caller)?;
        let record = self.content.upsert(code, title, url)?;
        log::info!("[admin] {} saved content '{}'", caller, record.code);
        Ok(record)
    }

    pub fn delete_content(&self, caller: i64, code: &str) -> Result<()> {
        self.admin.authorize(caller)?;
        if self.content.delete(code)? {
            log::info!("[admin] {} deleted content '{}'", caller, code.trim());
            Ok(())
        } else {
            Err(BotError::NotFound(code.trim().to_string()))
        }
    }

    pub fn set_channels(&self, caller: i64, channels: &[String]) -> Result<Vec<String>> {
        self.admin.authorize(caller)?;
        self.admin.set_force_channels(channels)
    }

    pub fn add_channel(&self, caller: i64, channel: &str) -> Result<Vec<String>> {
        self.admin.authorize(caller)?;
        self.admin.add_channel(channel)
    }

    pub fn remove_channel(&self, caller: i64, channel: &str) -> Result<Vec<String>> {
        self.admin.authorize(caller)?;
        self.admin.remove_channel(channel)
    }

    pub fn set_post_channel(&self, caller: i64, channel: &str) -> Result<()> {
        self.admin.authorize(caller)?;
        self.admin.set_post_channel(channel)
    }

    pub fn set_autopost_times(&self, caller: i64, times: &[String]) -> Result<Vec<NaiveTime>> {
        self.admin.authorize(caller)?;
        let stored = self.admin.set_autopost_times(times)?;
        self.schedule.reconcile()?;
        Ok(stored)
    }

    pub fn set_autopost_enabled(&self, caller: i64, enabled: bool) -> Result<()> {
        self.admin.authorize(caller)?;
        self.admin.set_autopost_enabled(enabled)?;
        self.schedule.reconcile()?;
        Ok(())
    }

    pub fn settings_summary(&self, caller: i64) -> Result<SettingsSummary> {
        self.admin.authorize(caller)?;
        Ok(SettingsSummary {
            force_channels: self.admin.force_channels()?,
            post_channel: self.admin.post_channel()?,
            autopost_times: self
                .admin
                .autopost_times()?
                .into_iter()
                .map(format_time)
                .collect(),
            autopost_enabled: self.admin.autopost_enabled()?,
            content_count: self.content.count()?,
        })
    }
}
