use chrono::NaiveTime;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::db::DEFAULT_AUTOPOST_TIMES;
use crate::error::{BotError, Result};
use crate::store::Store;

const KEY_FORCE_CHANNELS: &str = "force_channels";
const KEY_POST_CHANNEL: &str = "post_channel";
const KEY_AUTOPOST_TIMES: &str = "autopost_times";
const KEY_AUTOPOST_ENABLED: &str = "autopost_enabled";

fn time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid HH:MM pattern"))
}

/// User ids allowed to run admin operations.
#[derive(Debug, Clone, Default)]
pub struct AdminIdentitySet {
    ids: HashSet<i64>,
    open_when_empty: bool,
}

impl AdminIdentitySet {
    /// With `open_when_empty`, an empty set authorizes every caller.
    pub fn new(ids: impl IntoIterator<Item = i64>, open_when_empty: bool) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            open_when_empty,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ids.is_empty() && self.open_when_empty
    }

    pub fn permits(&self, user_id: i64) -> bool {
        self.is_open() || self.ids.contains(&user_id)
    }
}

/// Durable bot settings. Every setter writes through immediately.
#[derive(Clone)]
pub struct AdminConfig {
    store: Arc<dyn Store>,
    admins: AdminIdentitySet,
}

impl AdminConfig {
    pub fn new(store: Arc<dyn Store>, admins: AdminIdentitySet) -> Self {
        Self { store, admins }
    }

    pub fn admins(&self) -> &AdminIdentitySet {
        &self.admins
    }

    pub fn authorize(&self, caller: i64) -> Result<()> {
        if self.admins.permits(caller) {
            Ok(())
        } else {
            Err(BotError::Permission)
        }
    }

    // ── Force channels ──────────────────────────────────────────────

    pub fn force_channels(&self) -> Result<Vec<String>> {
        let raw = self.store.setting_get_or(KEY_FORCE_CHANNELS, "")?;
        Ok(split_list(&raw))
    }

    /// Replaces the list. Blank entries are dropped, duplicates keep their
    /// first position.
    pub fn set_force_channels(&self, channels: &[String]) -> Result<Vec<String>> {
        let mut out: Vec<String> = Vec::new();
        for ch in channels {
            let ch = ch.trim();
            if !ch.is_empty() && !out.iter().any(|c| c == ch) {
                out.push(ch.to_string());
            }
        }
        self.store.setting_set(KEY_FORCE_CHANNELS, &out.join(","))?;
        Ok(out)
    }

    pub fn add_channel(&self, channel: &str) -> Result<Vec<String>> {
        let channel = channel.trim();
        let mut channels = self.force_channels()?;
        if channel.is_empty() || channels.iter().any(|c| c == channel) {
            return Ok(channels);
        }
        channels.push(channel.to_string());
        self.set_force_channels(&channels)
    }

    pub fn remove_channel(&self, channel: &str) -> Result<Vec<String>> {
        let channel = channel.trim();
        let mut channels = self.force_channels()?;
        let before = channels.len();
        channels.retain(|c| c != channel);
        if channels.len() == before {
            return Ok(channels);
        }
        self.set_force_channels(&channels)
    }

    // ── Post channel ────────────────────────────────────────────────

    /// Empty string means publishing is off.
    pub fn post_channel(&self) -> Result<String> {
        Ok(self.store.setting_get_or(KEY_POST_CHANNEL, "")?.trim().to_string())
    }

    pub fn set_post_channel(&self, channel: &str) -> Result<()> {
        self.store.setting_set(KEY_POST_CHANNEL, channel.trim())
    }

    // ── Autopost ────────────────────────────────────────────────────

    /// Stored times, sorted. Entries that fail to parse are skipped.
    pub fn autopost_times(&self) -> Result<Vec<NaiveTime>> {
        let raw = self
            .store
            .setting_get_or(KEY_AUTOPOST_TIMES, &DEFAULT_AUTOPOST_TIMES.join(","))?;
        Ok(normalize_times(split_list(&raw).iter().map(String::as_str)))
    }

    /// Keeps valid `HH:MM` entries, deduplicates, and falls back to the
    /// default set when nothing valid remains.
    pub fn set_autopost_times(&self, times: &[String]) -> Result<Vec<NaiveTime>> {
        let mut valid = normalize_times(times.iter().map(String::as_str));
        if valid.is_empty() {
            valid = normalize_times(DEFAULT_AUTOPOST_TIMES.iter().copied());
        }
        let stored: Vec<String> = valid.iter().map(|t| format_time(*t)).collect();
        self.store.setting_set(KEY_AUTOPOST_TIMES, &stored.join(","))?;
        Ok(valid)
    }

    pub fn autopost_enabled(&self) -> Result<bool> {
        self.store.setting_get_bool(KEY_AUTOPOST_ENABLED)
    }

    pub fn set_autopost_enabled(&self, enabled: bool) -> Result<()> {
        self.store
            .setting_set(KEY_AUTOPOST_ENABLED, if enabled { "true" } else { "false" })
    }
}

pub fn is_valid_time(s: &str) -> bool {
    time_pattern().is_match(s)
}

pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

fn normalize_times<'a>(entries: impl Iterator<Item = &'a str>) -> Vec<NaiveTime> {
    let mut out: Vec<NaiveTime> = entries
        .map(str::trim)
        .filter(|s| is_valid_time(s))
        .filter_map(|s| NaiveTime::parse_from_str(s, "%H:%M").ok())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
