use std::io;
use thiserror::Error;

/// Failures the chat server distinguishes
///
/// Only `Startup` is fatal. The rest are confined to the session that
/// caused them and never reach the dispatcher loop.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("username already taken: {0}")]
    NameTaken(String),

    #[error("connection i/o error: {0}")]
    ConnectionIo(#[from] io::Error),

    #[error("malformed chat line, expected `name: body`: {0:?}")]
    MalformedMessage(String),

    #[error("failed to bind listener on {addr}: {source}")]
    Startup {
        addr: String,
        #[source]
        source: io::Error,
    },
}
