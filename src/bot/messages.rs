use crate::admin::format_time;
use crate::bot::commands::RECHECK;
use crate::error::BotError;
use crate::models::content::ContentRecord;
use crate::service::SettingsSummary;
use crate::tasks::PublishPayload;
use crate::telegram::{Button, Keyboard};
use chrono::NaiveTime;

pub fn welcome() -> String {
    "🎬 KinoMix TV botiga xush kelibsiz!\n\n\
     📌 Kino yoki serial kodini yuboring.\n\
     🔥 Eng yangi kinolar faqat bizda!"
        .to_string()
}

pub fn help(is_admin: bool) -> String {
    let mut text = String::from(
        "📌 Kino kodini yuboring.\n\n\
         /recent - yangi qo‘shilganlar\n\
         /top - eng ko‘p ko‘rilganlar",
    );
    if is_admin {
        text.push_str(
            "\n\nAdmin:\n\
             /add CODE | TITLE | URL\n\
             /del CODE\n\
             /setchannels @a @b\n\
             /addchannel @a\n\
             /delchannel @a\n\
             /postchannel @c\n\
             /times 09:00 18:00 21:00\n\
             /autopost on|off\n\
             /status",
        );
    }
    text
}

/// Share links without a scheme are not accepted as button urls.
pub fn link(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

pub fn found(record: &ContentRecord) -> (String, Keyboard) {
    let text = format!(
        "🎬 {}\n🔑 Kod: {}\n👁 Ko‘rishlar: {}",
        record.title, record.code, record.views
    );
    let keyboard = vec![vec![Button::Url {
        text: "▶️ Ko‘rish".into(),
        url: link(&record.url),
    }]];
    (text, keyboard)
}

pub fn not_found(code: &str) -> String {
    format!("❌ «{}» kodi bo‘yicha hech narsa topilmadi.", code)
}

/// Channels in configured order, then the recheck button.
pub fn blocked(channels: &[String]) -> (String, Keyboard) {
    let list: Vec<String> = channels
        .iter()
        .enumerate()
        .map(|(i, ch)| format!("{}. {}", i + 1, ch))
        .collect();
    let text = format!(
        "📢 Botdan foydalanish uchun quyidagi kanallarga obuna bo‘ling:\n\n{}\n\n\
         Obuna bo‘lgach «✅ Tekshirish» tugmasini bosing.",
        list.join("\n")
    );

    let mut keyboard: Keyboard = channels
        .iter()
        .filter_map(|ch| {
            ch.strip_prefix('@').map(|name| {
                vec![Button::Url {
                    text: format!("➕ {}", ch),
                    url: format!("https://t.me/{}", name),
                }]
            })
        })
        .collect();
    keyboard.push(vec![Button::Callback {
        text: "✅ Tekshirish".into(),
        data: RECHECK.into(),
    }]);
    (text, keyboard)
}

pub fn recheck_ok() -> String {
    "✅ Rahmat! Endi kino kodini yuborishingiz mumkin.".to_string()
}

pub fn recheck_still_blocked() -> String {
    "❗ Hali barcha kanallarga obuna bo‘lmagansiz.".to_string()
}

pub fn listing(header: &str, records: &[ContentRecord]) -> String {
    if records.is_empty() {
        return format!("{}\n\nHozircha hech narsa yo‘q.", header);
    }
    let lines: Vec<String> = records
        .iter()
        .map(|r| format!("🔑 {}  {}  (👁 {})", r.code, r.title, r.views))
        .collect();
    format!("{}\n\n{}", header, lines.join("\n"))
}

pub fn recent(records: &[ContentRecord]) -> String {
    listing("🆕 Yangi qo‘shilganlar:", records)
}

pub fn top(records: &[ContentRecord]) -> String {
    listing("🔥 Eng ko‘p ko‘rilganlar:", records)
}

pub fn saved(record: &ContentRecord) -> String {
    format!("✅ Saqlandi: {} | {} | {}", record.code, record.title, record.url)
}

pub fn deleted(code: &str) -> String {
    format!("🗑 O‘chirildi: {}", code)
}

pub fn channels(list: &[String]) -> String {
    if list.is_empty() {
        "📢 Majburiy kanallar: (yo‘q)".to_string()
    } else {
        format!("📢 Majburiy kanallar: {}", list.join(", "))
    }
}

pub fn post_channel(channel: &str) -> String {
    if channel.is_empty() {
        "📮 Post kanali: (o‘chirilgan)".to_string()
    } else {
        format!("📮 Post kanali: {}", channel)
    }
}

pub fn times(list: &[NaiveTime]) -> String {
    let labels: Vec<String> = list.iter().map(|t| format_time(*t)).collect();
    format!("⏰ Avtopost vaqtlari: {}", labels.join(", "))
}

pub fn autopost(enabled: bool) -> String {
    if enabled {
        "🤖 Avtopost: yoqildi".to_string()
    } else {
        "🤖 Avtopost: o‘chirildi".to_string()
    }
}

pub fn status(s: &SettingsSummary) -> String {
    format!(
        "{}\n{}\n⏰ Avtopost vaqtlari: {}\n{}\n🎞 Kontent soni: {}",
        channels(&s.force_channels),
        post_channel(&s.post_channel),
        s.autopost_times.join(", "),
        autopost(s.autopost_enabled),
        s.content_count
    )
}

pub fn usage(line: &str) -> String {
    format!("Foydalanish: {}", line)
}

pub fn unknown_command() -> String {
    "Noma’lum buyruq. /help".to_string()
}

pub fn error(e: &BotError) -> String {
    match e {
        BotError::Validation(msg) => format!("⚠️ Noto‘g‘ri ma’lumot: {}", msg),
        BotError::NotFound(code) => not_found(code),
        BotError::Permission => "⛔ Bu buyruq faqat adminlar uchun.".to_string(),
        BotError::External(_) | BotError::Storage(_) | BotError::Internal(_) => {
            "⚠️ Xatolik yuz berdi. Keyinroq urinib ko‘ring.".to_string()
        }
    }
}

pub fn autopost_post(payload: &PublishPayload) -> (String, Keyboard) {
    let text = format!(
        "🎬 {}\n🔑 Kod: {}\n\n📌 Kodni botga yuboring!",
        payload.title, payload.code
    );
    let keyboard = vec![vec![Button::Url {
        text: "▶️ Ko‘rish".into(),
        url: link(&payload.url),
    }]];
    (text, keyboard)
}
