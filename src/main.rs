#[macro_use]
extern crate rocket;

use std::fmt::Display;
use std::process;
use std::sync::Arc;

mod admin;
mod bot;
mod config;
mod content;
mod db;
mod error;
mod gate;
mod jobs;
mod models;
mod routes;
mod service;
mod store;
mod tasks;
mod telegram;


use admin::{AdminConfig, AdminIdentitySet};
use config::AppConfig;
use content::ContentStore;
use gate::{MembershipOracle, SubscriptionGate};
use jobs::JobScheduler;
use service::Service;
use store::sqlite::SqliteStore;
use store::Store;
use tasks::{Publisher, ScheduleManager};
use telegram::TelegramClient;

/// Startup failures are not recoverable: log and exit.
fn or_exit<T, E: Display>(result: Result<T, E>, what: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            log::error!("{}: {}", what, e);
            eprintln!("{}: {}", what, e);
            process::exit(1);
        }
    }
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let figment = AppConfig::figment();
    let config = or_exit(AppConfig::from_figment(&figment), "Invalid configuration");
    let tz = or_exit(config.tz(), "Invalid configuration");

    let store: Arc<dyn Store> = Arc::new(or_exit(
        SqliteStore::new_at(&config.database),
        "Failed to initialize database pool",
    ));
    or_exit(store.run_migrations(), "Failed to run database migrations");
    or_exit(store.seed_defaults(), "Failed to seed default settings");

    let admins = AdminIdentitySet::new(config.admin_ids.iter().copied(), config.open_admin_when_empty);
    if admins.is_open() {
        log::warn!("No admin ids configured: every user can run admin commands");
    }

    let telegram = Arc::new(TelegramClient::new(&config.telegram_api, &config.bot_token));
    let oracle: Arc<dyn MembershipOracle> = telegram.clone();
    let publisher: Arc<dyn Publisher> = telegram.clone();

    let admin = AdminConfig::new(Arc::clone(&store), admins);
    let content = ContentStore::new(Arc::clone(&store));
    let gate = SubscriptionGate::new(admin.clone(), oracle);
    let schedule = Arc::new(ScheduleManager::new(
        admin.clone(),
        content.clone(),
        publisher,
        JobScheduler::new(tz),
    ));
    let service = Service {
        admin,
        content,
        gate,
        schedule: Arc::clone(&schedule),
    };

    log::info!(
        "KinoMix bot starting (db: {}, timezone: {})",
        config.database,
        tz
    );

    rocket::custom(figment)
        .manage(config)
        .manage(service)
        .manage(schedule)
        .manage(telegram)
        .attach(tasks::BackgroundTasks)
        .mount("/api", routes::api::routes())
        .mount("/telegram", routes::webhook::routes())
}
