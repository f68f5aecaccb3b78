use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rocket::tokio;
use rocket::tokio::runtime::Handle;
use rocket::tokio::task::JoinHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{BotError, Result};

pub type JobId = u64;

pub type JobFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyJob {
    pub id: JobId,
    pub tag: String,
    pub at: NaiveTime,
}

struct Entry {
    job: DailyJob,
    timer: JoinHandle<()>,
}

/// Recurring once-a-day jobs in a single reference time zone.
///
/// Each job is a timer task that sleeps until the next wall-clock
/// occurrence, then hands the work to a detached blocking task. Cancelling
/// aborts the timer only, so a firing already in progress completes.
pub struct JobScheduler {
    tz: Tz,
    next_id: AtomicU64,
    jobs: Mutex<HashMap<JobId, Entry>>,
}

impl JobScheduler {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            next_id: AtomicU64::new(1),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Must be called from within a tokio runtime (async task or a
    /// `spawn_blocking` thread).
    pub fn schedule_daily(&self, tag: &str, at: NaiveTime, job: JobFn) -> Result<JobId> {
        let rt = Handle::try_current()
            .map_err(|e| BotError::Internal(format!("no runtime for job at {}: {}", at, e)))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let tz = self.tz;

        let timer = rt.spawn(async move {
            let mut last: Option<DateTime<Tz>> = None;
            loop {
                let now = Utc::now().with_timezone(&tz);
                let next = match next_fire_since(now, last, at) {
                    Some(t) => t,
                    None => {
                        log::error!("[jobs] job {} has no next occurrence for {}", id, at);
                        return;
                    }
                };
                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                let job = Arc::clone(&job);
                tokio::task::spawn_blocking(move || job());
                last = Some(next);
            }
        });

        self.lock().insert(
            id,
            Entry {
                job: DailyJob {
                    id,
                    tag: tag.to_string(),
                    at,
                },
                timer,
            },
        );
        Ok(id)
    }

    /// Cancels every job owned by `tag`; jobs of other owners are untouched.
    pub fn cancel_tag(&self, tag: &str) -> usize {
        let mut jobs = self.lock();
        let ids: Vec<JobId> = jobs
            .values()
            .filter(|e| e.job.tag == tag)
            .map(|e| e.job.id)
            .collect();
        for id in &ids {
            if let Some(entry) = jobs.remove(id) {
                entry.timer.abort();
            }
        }
        ids.len()
    }

    #[cfg(test)]
    pub fn cancel(&self, id: JobId) -> bool {
        match self.lock().remove(&id) {
            Some(entry) => {
                entry.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Active jobs for `tag`, ordered by fire time.
    #[cfg(test)]
    pub fn active(&self, tag: &str) -> Vec<DailyJob> {
        let mut out: Vec<DailyJob> = self
            .lock()
            .values()
            .filter(|e| e.job.tag == tag)
            .map(|e| e.job.clone())
            .collect();
        out.sort_by_key(|j| (j.at, j.id));
        out
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, Entry>> {
        // A panic while holding the map cannot leave it half-updated.
        self.jobs.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        for (_, entry) in self.lock().drain() {
            entry.timer.abort();
        }
    }
}

/// Next occurrence after both `now` and the previous firing. The timer
/// sleeps on the monotonic clock, so the wall clock can still read just
/// before `last` when it wakes.
pub fn next_fire_since(
    now: DateTime<Tz>,
    last: Option<DateTime<Tz>>,
    at: NaiveTime,
) -> Option<DateTime<Tz>> {
    let from = match last {
        Some(l) if l > now => l,
        _ => now,
    };
    next_fire_after(from, at)
}

/// First instant strictly after `now` whose local time in `now`'s zone is
/// `at`. A time skipped by a DST jump fires one hour later that day.
pub fn next_fire_after(now: DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    for _ in 0..3 {
        let local = day.and_time(at);
        let candidate = tz
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest());
        if let Some(t) = candidate {
            if t > now {
                return Some(t);
            }
        }
        day = day.succ_opt()?;
    }
    None
}
