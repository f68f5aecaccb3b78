use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

use crate::bot::handler;
use crate::config::AppConfig;
use crate::service::Service;
use crate::telegram::{TelegramClient, Update};

const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Guard: when a webhook secret is configured, Telegram must echo it back
/// in the secret-token header.
pub struct TelegramSource;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for TelegramSource {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let expected = request
            .rocket()
            .state::<AppConfig>()
            .and_then(|c| c.webhook_secret.clone())
            .filter(|s| !s.is_empty());

        let expected = match expected {
            Some(s) => s,
            None => return Outcome::Success(TelegramSource),
        };

        match request.headers().get_one(SECRET_HEADER) {
            Some(got) if got == expected => Outcome::Success(TelegramSource),
            _ => {
                log::warn!("[bot] webhook call rejected: bad secret token");
                Outcome::Error((Status::Forbidden, ()))
            }
        }
    }
}

#[post("/webhook", format = "json", data = "<update>")]
pub async fn telegram_webhook(
    _source: TelegramSource,
    service: &State<Service>,
    client: &State<Arc<TelegramClient>>,
    update: Json<Update>,
) -> Status {
    let service = service.inner().clone();
    let client = Arc::clone(client.inner());
    let update = update.into_inner();
    let update_id = update.update_id;

    let result = rocket::tokio::task::spawn_blocking(move || {
        let outgoing = handler::handle_update(&service, &update);
        handler::deliver(&client, &outgoing);
    })
    .await;

    if let Err(e) = result {
        log::error!("[bot] update {} handler died: {}", update_id, e);
    }
    // Always acknowledge so Telegram does not redeliver.
    Status::Ok
}

pub fn routes() -> Vec<rocket::Route> {
    routes![telegram_webhook]
}
