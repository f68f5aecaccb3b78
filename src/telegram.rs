//! Minimal Telegram Bot API adapter: membership checks, channel posts and
//! replies over blocking HTTP, plus the update types the webhook receives.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::bot::messages;
use crate::error::{BotError, Result};
use crate::gate::{MemberStatus, MembershipOracle};
use crate::tasks::{PublishPayload, Publisher};

// ── Update types ──────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Button {
    Url { text: String, url: String },
    Callback { text: String, data: String },
}

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<Button>>;

fn keyboard_json(keyboard: &Keyboard) -> Value {
    let rows: Vec<Value> = keyboard
        .iter()
        .map(|row| {
            Value::Array(
                row.iter()
                    .map(|b| match b {
                        Button::Url { text, url } => json!({"text": text, "url": url}),
                        Button::Callback { text, data } => {
                            json!({"text": text, "callback_data": data})
                        }
                    })
                    .collect(),
            )
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

/// Maps a `getChatMember` status string.
pub fn parse_member_status(status: &str, is_member: Option<bool>) -> Option<MemberStatus> {
    match status {
        "creator" => Some(MemberStatus::Owner),
        "administrator" => Some(MemberStatus::Moderator),
        "member" => Some(MemberStatus::Member),
        "restricted" => Some(if is_member.unwrap_or(false) {
            MemberStatus::Member
        } else {
            MemberStatus::Left
        }),
        "left" => Some(MemberStatus::Left),
        "kicked" => Some(MemberStatus::Kicked),
        _ => None,
    }
}

// ── Client ────────────────────────────────────────────

pub struct TelegramClient {
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Blocking call; never invoke from an async task directly.
    fn call(&self, method: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BotError::External(format!("HTTP client error: {}", e)))?;

        let resp = client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| BotError::External(format!("{} request failed: {}", method, e)))?;

        let status = resp.status();
        let json: Value = resp
            .json()
            .map_err(|e| BotError::External(format!("{} JSON parse error: {}", method, e)))?;

        if !status.is_success() || json.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let description = json
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("no description");
            return Err(BotError::External(format!(
                "{} returned {}: {}",
                method, status, description
            )));
        }

        Ok(json.get("result").cloned().unwrap_or(Value::Null))
    }

    pub fn send_message(&self, chat_id: &str, text: &str, keyboard: Option<&Keyboard>) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": false,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = keyboard_json(kb);
        }
        self.call("sendMessage", &body).map(|_| ())
    }

    pub fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let mut body = json!({ "callback_query_id": callback_id });
        if let Some(t) = text {
            body["text"] = json!(t);
        }
        self.call("answerCallbackQuery", &body).map(|_| ())
    }
}

impl MembershipOracle for TelegramClient {
    fn get_membership(&self, channel: &str, user_id: i64) -> Result<MemberStatus> {
        let result = self.call(
            "getChatMember",
            &json!({ "chat_id": channel, "user_id": user_id }),
        )?;
        let status = result
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or_default();
        let is_member = result.get("is_member").and_then(|v| v.as_bool());
        parse_member_status(status, is_member)
            .ok_or_else(|| BotError::External(format!("unknown member status '{}'", status)))
    }
}

impl Publisher for TelegramClient {
    fn publish(&self, channel: &str, payload: &PublishPayload) -> Result<()> {
        let (text, keyboard) = messages::autopost_post(payload);
        self.send_message(channel, &text, Some(&keyboard))
    }
}
