/// Callback data carried by the "check again" button.
pub const RECHECK: &str = "recheck";

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Recent(i64),
    Top(i64),
    /// Any plain text is a code.
    Lookup(String),
    Add {
        code: String,
        title: String,
        url: String,
    },
    Delete(String),
    SetChannels(Vec<String>),
    AddChannel(String),
    RemoveChannel(String),
    PostChannel(String),
    Times(Vec<String>),
    Autopost(bool),
    Status,
    /// Known command with bad arguments; carries the usage line.
    Usage(&'static str),
    Unknown(String),
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub fn parse(text: &str) -> Option<Command> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if !text.starts_with('/') {
        return Some(Command::Lookup(text.to_string()));
    }

    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (text, ""),
    };
    // "/cmd@BotName" in group chats
    let name = head[1..].split('@').next().unwrap_or_default().to_lowercase();
    let args: Vec<String> = rest.split_whitespace().map(String::from).collect();

    let cmd = match name.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "recent" | "new" => Command::Recent(clamp_limit(args.first().and_then(|a| a.parse().ok()))),
        "top" => Command::Top(clamp_limit(args.first().and_then(|a| a.parse().ok()))),
        "add" => parse_add(rest).unwrap_or(Command::Usage("/add CODE | TITLE | URL")),
        "del" | "delete" => match args.as_slice() {
            [code] => Command::Delete(code.clone()),
            _ => Command::Usage("/del CODE"),
        },
        "setchannels" => Command::SetChannels(
            rest.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        ),
        "addchannel" => match args.as_slice() {
            [ch] => Command::AddChannel(ch.clone()),
            _ => Command::Usage("/addchannel @channel"),
        },
        "delchannel" => match args.as_slice() {
            [ch] => Command::RemoveChannel(ch.clone()),
            _ => Command::Usage("/delchannel @channel"),
        },
        "postchannel" => match args.as_slice() {
            [ch] => Command::PostChannel(ch.clone()),
            [] => Command::PostChannel(String::new()),
            _ => Command::Usage("/postchannel @channel"),
        },
        "times" => {
            if args.is_empty() {
                Command::Usage("/times 09:00 18:00 21:00")
            } else {
                Command::Times(
                    rest.split(|c: char| c == ',' || c.is_whitespace())
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                )
            }
        }
        "autopost" => match args.first().map(|a| a.to_lowercase()).as_deref() {
            Some("on" | "1" | "true" | "yoq") => Command::Autopost(true),
            Some("off" | "0" | "false" | "ochir") => Command::Autopost(false),
            _ => Command::Usage("/autopost on|off"),
        },
        "status" => Command::Status,
        _ => Command::Unknown(name),
    };
    Some(cmd)
}

/// `CODE | TITLE | URL`, or `CODE TITLE WORDS... URL`.
fn parse_add(rest: &str) -> Option<Command> {
    if rest.contains('|') {
        let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
        return match parts.as_slice() {
            [code, title, url] if !code.is_empty() && !url.is_empty() => Some(Command::Add {
                code: code.to_string(),
                title: title.to_string(),
                url: url.to_string(),
            }),
            _ => None,
        };
    }

    let words: Vec<&str> = rest.split_whitespace().collect();
    if words.len() < 3 {
        return None;
    }
    Some(Command::Add {
        code: words[0].to_string(),
        title: words[1..words.len() - 1].join(" "),
        url: words[words.len() - 1].to_string(),
    })
}
