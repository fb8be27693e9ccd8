//! Session registry for the chat server
//!
//! This module owns the set of admitted sessions:
//! - Username uniqueness across all active sessions
//! - Color tag assignment and release
//! - Insertion-ordered snapshots for broadcasting
//!
//! The registry is plain data with no locking. It is owned by the dispatcher
//! task and only ever touched from there, so every admit and evict runs to
//! completion before the next one starts.

use crate::color::{ColorPool, ColorTag};
use crate::error::ChatError;
use log::info;
use std::collections::HashSet;
use std::fmt;
use tokio::sync::mpsc;

/// Identity of one accepted TCP connection
///
/// Eviction goes by this id rather than by name, so a stale evict can
/// never remove a newer session that happens to reuse the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A connection that finished its handshake but is not admitted yet
#[derive(Debug)]
pub struct Candidate {
    pub id: SessionId,
    pub name: String,
    /// Queue feeding the connection's writer task
    pub outbound: mpsc::Sender<String>,
}

/// An admitted chat participant
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub color: ColorTag,
    pub outbound: mpsc::Sender<String>,
    /// False when the color came from the round-robin fallback
    owns_color: bool,
}

/// Registry of active sessions and the names they hold
///
/// Invariant: `names` is exactly the set of names in `sessions`, and no
/// two sessions share a name.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Active sessions in admission order
    sessions: Vec<Session>,
    names: HashSet<String>,
    colors: ColorPool,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a candidate under its requested name
    ///
    /// On success the session gets a color and becomes part of every
    /// following snapshot. On `NameTaken` the candidate is handed back so
    /// the caller can reply to it before dropping the connection.
    pub fn admit(&mut self, candidate: Candidate) -> Result<&Session, (ChatError, Candidate)> {
        if self.names.contains(&candidate.name) {
            let err = ChatError::NameTaken(candidate.name.clone());
            return Err((err, candidate));
        }

        let allocation = self.colors.allocate(self.sessions.len());
        self.names.insert(candidate.name.clone());
        self.sessions.push(Session {
            id: candidate.id,
            name: candidate.name,
            color: allocation.tag,
            outbound: candidate.outbound,
            owns_color: allocation.exclusive,
        });

        let session = &self.sessions[self.sessions.len() - 1];
        info!(
            "Session {} admitted as '{}' with color {}",
            session.id, session.name, session.color
        );
        Ok(session)
    }

    /// Removes a session by connection identity
    ///
    /// Frees its name and color. Returns None if it was already gone,
    /// which makes duplicate evicts harmless.
    pub fn evict(&mut self, id: SessionId) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        let session = self.sessions.remove(index);

        self.names.remove(&session.name);
        if session.owns_color {
            self.colors.release(session.color);
        }

        info!("Session {} ('{}') evicted", session.id, session.name);
        Some(session)
    }

    /// Active sessions at this instant, in admission order
    pub fn snapshot(&self) -> &[Session] {
        &self.sessions
    }

    /// Current color of the named sender, if it is still active
    pub fn color_of(&self, name: &str) -> Option<ColorTag> {
        self.sessions
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.color)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
