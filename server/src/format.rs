//! Rendering of outbound wire lines
//!
//! Everything here is pure string building and safe to call from any task.

use crate::color::ColorTag;
use crate::error::ChatError;
use chat_shared::{split_chat, PING};
use log::debug;

pub const RESET: &str = "[-]";
pub const ALERT: &str = "[red]";

/// A line to broadcast, parsed once where it enters the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    /// `sender: body`
    Chat { sender: String, body: String },
    /// Liveness marker from the heartbeat
    Ping,
    /// Anything without the `name: ` prefix, relayed verbatim
    Raw(String),
}

impl Publication {
    /// Parses a client line, degrading malformed input to `Raw`
    pub fn from_line(line: &str) -> Self {
        match parse_chat(line) {
            Ok((sender, body)) => Publication::Chat {
                sender: sender.to_string(),
                body: body.to_string(),
            },
            Err(e) => {
                debug!("{}, relaying as-is", e);
                Publication::Raw(line.to_string())
            }
        }
    }

    pub fn sender(&self) -> Option<&str> {
        match self {
            Publication::Chat { sender, .. } => Some(sender),
            _ => None,
        }
    }
}

pub fn parse_chat(line: &str) -> Result<(&str, &str), ChatError> {
    split_chat(line).ok_or_else(|| ChatError::MalformedMessage(line.to_string()))
}

pub fn format_chat(sender: &str, color: ColorTag, body: &str) -> String {
    format!("{}{}{}: {}", color, sender, RESET, body)
}

pub fn format_system(text: &str) -> String {
    format!("{}{}{}", ALERT, text, RESET)
}

pub fn format_join(name: &str, color: ColorTag) -> String {
    format_system(&format!(
        "Robot: {}{}{} {}has joined the chat.{}",
        color, name, RESET, ALERT, RESET
    ))
}

pub fn format_leave(name: &str) -> String {
    format_system(&format!("Robot: {} has left the chat.", name))
}

/// Renders a publication; `color` is the sender's tag for chat lines
pub fn format_publication(publication: &Publication, color: ColorTag) -> String {
    match publication {
        Publication::Chat { sender, body } => format_chat(sender, color, body),
        Publication::Ping => PING.to_string(),
        Publication::Raw(line) => line.clone(),
    }
}
