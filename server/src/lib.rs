//! # Chat Relay Server Library
//!
//! This library provides the server side of a line-based TCP chat relay. It
//! accepts many concurrent connections, gives each one a unique display name
//! and a color tag, and fans out every chat line to all connected clients
//! together with system notices for joins and departures.
//!
//! ## Core Responsibilities
//!
//! ### Session Management
//! Handles the complete lifecycle of a chat session:
//! - Username handshake and uniqueness enforcement
//! - Color tag assignment from a fixed palette
//! - Departure handling on EOF, read errors or dropped connections
//!
//! ### Broadcasting
//! Every published line is rendered once and delivered to each active
//! session. Join and leave notices travel the same path, so all clients see
//! the same sequence of events.
//!
//! ### In-band Control Protocol
//! A few directives share the text stream with ordinary chat:
//! - `SYSTEM_MESSAGE:UsernameTaken` rejects a handshake
//! - `SYSTEM_MESSAGE:Color:<tag>` announces the assigned color
//! - `SYSTEM_MESSAGE:PING` is emitted periodically for client watchdogs
//! - `!man` and `!party` are answered to the requesting client only
//!
//! ## Architecture Design
//!
//! ### Single Event Loop
//! All registry mutations and all broadcasts go through one dispatcher task
//! that consumes publish, admit and evict events one at a time. The registry
//! is owned by that task alone, so there are no locks and no interleaving.
//!
//! ### Per-Session Writers
//! The dispatcher never writes to a socket. Each session has a bounded queue
//! drained by its own writer task; a slow client only fills its own queue.
//!
//! ## Module Organization
//!
//! ### Color Module (`color`)
//! The palette and the allocator handing out tags.
//!
//! ### Registry Module (`registry`)
//! Active sessions, the set of names in use, admit and evict.
//!
//! ### Format Module (`format`)
//! Pure rendering of chat lines and system notices.
//!
//! ### Dispatcher Module (`dispatcher`)
//! The event loop that owns the registry and fans lines out.
//!
//! ### Connection Module (`connection`)
//! Per-socket handshake and read loop.
//!
//! ### Network Module (`network`)
//! Listener setup and the accept loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use chat_server::config::ServerConfig;
//! use chat_server::network::ChatServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = ChatServer::bind(ServerConfig::default()).await?;
//!     println!("Listening on {}", server.local_addr()?);
//!
//!     // Runs the dispatcher, the heartbeat and one task per client
//!     server.run().await;
//!
//!     Ok(())
//! }
//! ```

pub mod color;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod heartbeat;
pub mod network;
pub mod registry;
pub mod utils;
pub mod writer;
