use chrono::NaiveTime;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::admin::{format_time, AdminConfig};
use crate::content::ContentStore;
use crate::error::{BotError, Result};
use crate::jobs::{JobFn, JobScheduler};
use crate::models::content::ContentRecord;

/// Owner tag for autopost jobs in the shared scheduler.
pub const AUTOPOST_TAG: &str = "autopost";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishPayload {
    pub code: String,
    pub title: String,
    pub url: String,
}

impl From<&ContentRecord> for PublishPayload {
    fn from(r: &ContentRecord) -> Self {
        Self {
            code: r.code.clone(),
            title: r.title.clone(),
            url: r.url.clone(),
        }
    }
}

/// Posts a payload to a channel.
pub trait Publisher: Send + Sync {
    fn publish(&self, channel: &str, payload: &PublishPayload) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
    Disabled,
    NoPostChannel,
    NoContent,
    Published { channel: String, code: String },
    Failed(String),
}

/// Keeps one daily autopost job per configured time.
pub struct ScheduleManager {
    admin: AdminConfig,
    content: ContentStore,
    publisher: Arc<dyn Publisher>,
    jobs: JobScheduler,
    reconcile_lock: Mutex<()>,
}

impl ScheduleManager {
    pub fn new(
        admin: AdminConfig,
        content: ContentStore,
        publisher: Arc<dyn Publisher>,
        jobs: JobScheduler,
    ) -> Self {
        Self {
            admin,
            content,
            publisher,
            jobs,
            reconcile_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn jobs(&self) -> &JobScheduler {
        &self.jobs
    }

    /// Replaces all autopost jobs with one job per configured time.
    /// Safe to call repeatedly; concurrent calls are serialized.
    pub fn reconcile(self: &Arc<Self>) -> Result<Vec<NaiveTime>> {
        // Read under the lock so the last reconcile to run sees the latest times.
        let _guard = self.reconcile_lock.lock().unwrap_or_else(|p| p.into_inner());
        let times = self.admin.autopost_times()?;

        let cancelled = self.jobs.cancel_tag(AUTOPOST_TAG);
        for at in &times {
            let at = *at;
            let manager = Arc::downgrade(self);
            let job: JobFn = Arc::new(move || {
                if let Some(m) = manager.upgrade() {
                    m.on_fire(at);
                }
            });
            self.jobs.schedule_daily(AUTOPOST_TAG, at, job)?;
        }

        let labels: Vec<String> = times.iter().map(|t| format_time(*t)).collect();
        log::info!(
            "[autopost] Rescheduled: cancelled {}, active at [{}] ({})",
            cancelled,
            labels.join(", "),
            self.jobs.timezone()
        );
        Ok(times)
    }

    /// One firing. Settings are read now, not when the job was scheduled.
    /// Publish failures are logged and swallowed.
    pub fn on_fire(&self, at: NaiveTime) -> FireOutcome {
        let outcome = self.fire();
        match &outcome {
            FireOutcome::Published { channel, code } => {
                log::info!("[autopost] {} posted '{}' to {}", format_time(at), code, channel)
            }
            FireOutcome::Failed(e) => {
                log::error!("[autopost] {} firing failed: {}", format_time(at), e)
            }
            other => log::debug!("[autopost] {} skipped: {:?}", format_time(at), other),
        }
        outcome
    }

    fn fire(&self) -> FireOutcome {
        match self.admin.autopost_enabled() {
            Ok(true) => {}
            Ok(false) => return FireOutcome::Disabled,
            Err(e) => return FireOutcome::Failed(e.to_string()),
        }

        let channel = match self.admin.post_channel() {
            Ok(c) if c.is_empty() => return FireOutcome::NoPostChannel,
            Ok(c) => c,
            Err(e) => return FireOutcome::Failed(e.to_string()),
        };

        let record = match self.content.random_pick() {
            Ok(r) => r,
            Err(BotError::NotFound(_)) => return FireOutcome::NoContent,
            Err(e) => return FireOutcome::Failed(e.to_string()),
        };

        match self.publisher.publish(&channel, &PublishPayload::from(&record)) {
            Ok(()) => FireOutcome::Published {
                channel,
                code: record.code,
            },
            Err(e) => FireOutcome::Failed(e.to_string()),
        }
    }
}

/// Schedules autopost jobs once the server is up.
pub struct BackgroundTasks;

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Background Tasks",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let manager = match rocket.state::<Arc<ScheduleManager>>() {
            Some(m) => Arc::clone(m),
            None => {
                log::error!("[task] ScheduleManager not found in managed state");
                return;
            }
        };

        let result = rocket::tokio::task::spawn_blocking(move || manager.reconcile()).await;
        match result {
            Ok(Ok(_)) => log::info!("[task] Background tasks started"),
            Ok(Err(e)) => log::error!("[task] Autopost scheduling failed: {}", e),
            Err(e) => log::error!("[task] Autopost scheduling panicked: {}", e),
        }
    }
}
