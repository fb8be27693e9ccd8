//! Wire protocol shared by the chat server and client
//!
//! Every unit on the wire is one newline-terminated UTF-8 line. Directives are
//! distinguished by the `SYSTEM_MESSAGE:` prefix and are parsed into tagged
//! variants here, so neither side branches on raw strings past this boundary.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9999;
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

pub const DIRECTIVE_PREFIX: &str = "SYSTEM_MESSAGE:";
pub const USERNAME_TAKEN: &str = "SYSTEM_MESSAGE:UsernameTaken";
pub const COLOR_PREFIX: &str = "SYSTEM_MESSAGE:Color:";
pub const PING: &str = "SYSTEM_MESSAGE:PING";

/// Separator between the sender name and the body of a chat line
pub const CHAT_SEPARATOR: &str = ": ";

const MAN_TEXT: &str = "Robot: To scroll through the chat, use the arrow keys or your mouse wheel. To focus on the input section, press Tab.";

const PARTY_TEXT: &str = "
░░░░░░░░▄▄▄▀▀▀▄▄███▄░░░░░░░░░░░░░░
░░░░░▄▀▀░░░░░░░▐░▀██▌░░░░░░░░░░░░░
░░░▄▀░░░░▄▄███░▌▀▀░▀█░░░░░░░░░░░░░
░░▄█░░▄▀▀▒▒▒▒▒▄▐░░░░█▌░░░░░░░░░░░░
░▐█▀▄▀▄▄▄▄▀▀▀▀▌░░░░░▐█▄░░░░░░░░░░░
░▌▄▄▀▀░░░░░░░░▌░░░░▄███████▄░░░░░░
░░░░░░░░░░░░░▐░░░░▐███████████▄░░░
░░░░░le░░░░░░░▐░░░░▐█████████████▄
░░░░toucan░░░░░░▀▄░░░▐█████████████▄
░░░░░░has░░░░░░░░▀▄▄███████████████
░░░░░arrived░░░░░░░░░░░░█▀██████░░";

/// A line sent from the server to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    /// Handshake rejected; the connection is closed right after
    UsernameTaken,
    /// Color tag assigned to the receiving session
    ColorAssign { tag: String },
    /// Liveness marker, never displayed
    Ping,
    /// Anything meant for display: chat lines and system notices
    Display(String),
}

impl ServerLine {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(&['\r', '\n'][..]);

        if line == USERNAME_TAKEN {
            ServerLine::UsernameTaken
        } else if line == PING {
            ServerLine::Ping
        } else if let Some(tag) = line.strip_prefix(COLOR_PREFIX) {
            ServerLine::ColorAssign {
                tag: tag.to_string(),
            }
        } else {
            ServerLine::Display(line.to_string())
        }
    }
}

impl fmt::Display for ServerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerLine::UsernameTaken => f.write_str(USERNAME_TAKEN),
            ServerLine::ColorAssign { tag } => write!(f, "{}{}", COLOR_PREFIX, tag),
            ServerLine::Ping => f.write_str(PING),
            ServerLine::Display(text) => f.write_str(text),
        }
    }
}

/// Commands a client can invoke; answered only to the requesting connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Man,
    Party,
}

impl ClientCommand {
    /// Detects a command in a client line
    ///
    /// Looks at the text after the first `:` (the `name:` prefix the client
    /// adds), or at the whole line if there is none, and matches by prefix.
    pub fn detect(line: &str) -> Option<Self> {
        let content = match line.find(':') {
            Some(idx) => line[idx + 1..].trim(),
            None => line,
        };

        if content.starts_with("!man") {
            Some(ClientCommand::Man)
        } else if content.starts_with("!party") {
            Some(ClientCommand::Party)
        } else {
            None
        }
    }

    /// Canned response text, possibly spanning several lines
    pub fn response(self) -> &'static str {
        match self {
            ClientCommand::Man => MAN_TEXT,
            ClientCommand::Party => PARTY_TEXT,
        }
    }
}

/// Splits `name: body` at the first separator
///
/// Returns None when the separator is missing.
pub fn split_chat(line: &str) -> Option<(&str, &str)> {
    line.split_once(CHAT_SEPARATOR)
}

/// True for lines carrying the directive prefix
///
/// Only the server may emit these; a client line that looks like one is
/// never relayed.
pub fn is_directive_line(line: &str) -> bool {
    line.starts_with(DIRECTIVE_PREFIX)
}

/// Builds the line a client sends for a typed message
pub fn compose_chat(name: &str, body: &str) -> String {
    format!("{}{}{}", name, CHAT_SEPARATOR, body)
}
