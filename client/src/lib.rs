//! # Chat Relay Client Library
//!
//! A line-oriented terminal client for the chat relay server. It performs
//! the username handshake, turns typed lines into `name: text` messages and
//! prints what the server relays.
//!
//! ## Protocol Handling
//!
//! Server directives are parsed into `chat_shared::ServerLine` and acted on
//! rather than shown:
//! - `UsernameTaken` ends the session with an explanation
//! - `ColorAssign` records the color the server picked for us
//! - `Ping` feeds the watchdog and is never displayed
//!
//! ## Watchdog
//!
//! The server sends a ping every few seconds. If none arrives within the
//! configured window the client assumes the server died and exits instead
//! of hanging on a half-open connection.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! Connection setup, the handshake and the main select loop.
//!
//! ### Display Module (`display`)
//! Stripping of color markup for plain terminals.

pub mod display;
pub mod network;
