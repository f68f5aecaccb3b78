use chrono_tz::Tz;
use rocket::figment::providers::Env;
use rocket::figment::Figment;
use serde::Deserialize;

/// Process configuration.
///
/// Sources, lowest priority first: `Rocket.toml` and `ROCKET_*` (Rocket's
/// own figment), a bare `BOT_TOKEN` variable, then `KINOMIX_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Telegram user ids allowed to run admin commands.
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    /// Whether an empty `admin_ids` lets every user act as admin.
    #[serde(default = "default_true")]
    pub open_admin_when_empty: bool,
    #[serde(default = "default_database")]
    pub database: String,
    /// IANA zone in which autopost times are interpreted.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_telegram_api")]
    pub telegram_api: String,
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_database() -> String {
    "data/kinomix.db".to_string()
}

fn default_timezone() -> String {
    "Asia/Tashkent".to_string()
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

impl AppConfig {
    pub fn figment() -> Figment {
        rocket::Config::figment()
            .merge(Env::raw().only(&["BOT_TOKEN"]))
            .merge(Env::prefixed("KINOMIX_"))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, String> {
        let config: AppConfig = figment.extract().map_err(|e| e.to_string())?;
        if config.bot_token.trim().is_empty() {
            return Err("BOT_TOKEN is not set".to_string());
        }
        config.tz()?;
        Ok(config)
    }

    pub fn tz(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("invalid timezone '{}': {}", self.timezone, e))
    }
}
