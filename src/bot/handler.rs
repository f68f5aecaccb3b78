use crate::bot::commands::{self, Command, RECHECK};
use crate::bot::messages;
use crate::error::{BotError, Result};
use crate::gate::GateDecision;
use crate::service::{Lookup, Service};
use crate::telegram::{CallbackQuery, Keyboard, Message, TelegramClient, Update};

#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Message {
        chat_id: i64,
        text: String,
        keyboard: Option<Keyboard>,
    },
    CallbackAnswer {
        callback_id: String,
        text: Option<String>,
    },
}

impl Outgoing {
    fn text(chat_id: i64, text: String) -> Self {
        Outgoing::Message {
            chat_id,
            text,
            keyboard: None,
        }
    }

    fn with_keyboard(chat_id: i64, (text, keyboard): (String, Keyboard)) -> Self {
        Outgoing::Message {
            chat_id,
            text,
            keyboard: Some(keyboard),
        }
    }
}

/// Works out the replies for one update without touching the network.
pub fn handle_update(service: &Service, update: &Update) -> Vec<Outgoing> {
    if let Some(cq) = &update.callback_query {
        return handle_callback(service, cq);
    }
    match &update.message {
        Some(msg) => handle_message(service, msg),
        None => vec![],
    }
}

fn handle_message(service: &Service, msg: &Message) -> Vec<Outgoing> {
    let chat_id = msg.chat.id;
    let user_id = msg.from.as_ref().map(|u| u.id).unwrap_or(chat_id);
    let cmd = match msg.text.as_deref().and_then(commands::parse) {
        Some(c) => c,
        None => return vec![],
    };

    match dispatch(service, chat_id, user_id, cmd) {
        Ok(out) => out,
        Err(e) => {
            if !matches!(e, BotError::Permission | BotError::Validation(_) | BotError::NotFound(_)) {
                log::error!("[bot] update from {} failed: {}", user_id, e);
            }
            vec![Outgoing::text(chat_id, messages::error(&e))]
        }
    }
}

fn dispatch(service: &Service, chat_id: i64, user_id: i64, cmd: Command) -> Result<Vec<Outgoing>> {
    let reply = match cmd {
        Command::Start => Outgoing::text(chat_id, messages::welcome()),
        Command::Help => Outgoing::text(
            chat_id,
            messages::help(service.admin.admins().permits(user_id)),
        ),
        Command::Lookup(code) => match service.lookup(user_id, &code)? {
            Lookup::Found { record } => Outgoing::with_keyboard(chat_id, messages::found(&record)),
            Lookup::Blocked { channels } => {
                Outgoing::with_keyboard(chat_id, messages::blocked(&channels))
            }
            Lookup::NotFound { code } => Outgoing::text(chat_id, messages::not_found(&code)),
        },
        Command::Recent(limit) => {
            Outgoing::text(chat_id, messages::recent(&service.list_recent(limit)?))
        }
        Command::Top(limit) => Outgoing::text(chat_id, messages::top(&service.top_by_views(limit)?)),
        Command::Add { code, title, url } => {
            let record = service.add_content(user_id, &code, &title, &url)?;
            Outgoing::text(chat_id, messages::saved(&record))
        }
        Command::Delete(code) => {
            service.delete_content(user_id, &code)?;
            Outgoing::text(chat_id, messages::deleted(&code))
        }
        Command::SetChannels(list) => {
            let stored = service.set_channels(user_id, &list)?;
            Outgoing::text(chat_id, messages::channels(&stored))
        }
        Command::AddChannel(ch) => {
            let stored = service.add_channel(user_id, &ch)?;
            Outgoing::text(chat_id, messages::channels(&stored))
        }
        Command::RemoveChannel(ch) => {
            let stored = service.remove_channel(user_id, &ch)?;
            Outgoing::text(chat_id, messages::channels(&stored))
        }
        Command::PostChannel(ch) => {
            service.set_post_channel(user_id, &ch)?;
            Outgoing::text(chat_id, messages::post_channel(ch.trim()))
        }
        Command::Times(list) => {
            let stored = service.set_autopost_times(user_id, &list)?;
            Outgoing::text(chat_id, messages::times(&stored))
        }
        Command::Autopost(enabled) => {
            service.set_autopost_enabled(user_id, enabled)?;
            Outgoing::text(chat_id, messages::autopost(enabled))
        }
        Command::Status => {
            let summary = service.settings_summary(user_id)?;
            Outgoing::text(chat_id, messages::status(&summary))
        }
        Command::Usage(line) => Outgoing::text(chat_id, messages::usage(line)),
        Command::Unknown(_) => Outgoing::text(chat_id, messages::unknown_command()),
    };
    Ok(vec![reply])
}

fn handle_callback(service: &Service, cq: &CallbackQuery) -> Vec<Outgoing> {
    let chat_id = cq.message.as_ref().map(|m| m.chat.id).unwrap_or(cq.from.id);
    if cq.data.as_deref() != Some(RECHECK) {
        return vec![Outgoing::CallbackAnswer {
            callback_id: cq.id.clone(),
            text: None,
        }];
    }

    match service.recheck(cq.from.id) {
        Ok(GateDecision::Allowed) => vec![
            Outgoing::CallbackAnswer {
                callback_id: cq.id.clone(),
                text: None,
            },
            Outgoing::text(chat_id, messages::recheck_ok()),
        ],
        Ok(GateDecision::Blocked(channels)) => vec![
            Outgoing::CallbackAnswer {
                callback_id: cq.id.clone(),
                text: Some(messages::recheck_still_blocked()),
            },
            Outgoing::with_keyboard(chat_id, messages::blocked(&channels)),
        ],
        Err(e) => {
            log::error!("[bot] recheck for {} failed: {}", cq.from.id, e);
            vec![Outgoing::CallbackAnswer {
                callback_id: cq.id.clone(),
                text: Some(messages::error(&e)),
            }]
        }
    }
}

/// Sends replies; a failed send is logged and the rest still go out.
pub fn deliver(client: &TelegramClient, outgoing: &[Outgoing]) {
    for out in outgoing {
        let result = match out {
            Outgoing::Message {
                chat_id,
                text,
                keyboard,
            } => client.send_message(&chat_id.to_string(), text, keyboard.as_ref()),
            Outgoing::CallbackAnswer { callback_id, text } => {
                client.answer_callback(callback_id, text.as_deref())
            }
        };
        if let Err(e) = result {
            log::warn!("[bot] reply failed: {}", e);
        }
    }
}
