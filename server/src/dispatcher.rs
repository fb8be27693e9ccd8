//! Broadcast dispatcher: the single serialization point of the server
//!
//! Connection handlers and the heartbeat never touch shared state. They send
//! events into one queue and the dispatcher applies them strictly one at a
//! time, in arrival order. Since each event is fully applied (registry
//! updated, every line enqueued) before the next is looked at, joins, leaves
//! and messages appear in the same order in every client's output.

use crate::color::{ColorTag, NEUTRAL};
use crate::format::{format_join, format_leave, format_publication, Publication};
use crate::registry::{Candidate, SessionId, SessionRegistry};
use chat_shared::ServerLine;
use log::{debug, info, warn};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

/// Events consumed by the dispatcher loop
#[derive(Debug)]
pub enum Event {
    Publish(Publication),
    Admit {
        candidate: Candidate,
        reply: oneshot::Sender<Admission>,
    },
    Evict {
        id: SessionId,
    },
}

/// Outcome of an admit event, reported back to the connection handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { color: ColorTag },
    Rejected,
}

/// Cloneable producer side of the dispatcher queue
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    events: mpsc::UnboundedSender<Event>,
}

impl DispatcherHandle {
    /// Queues a line for broadcast; false once the dispatcher has stopped
    pub fn publish(&self, publication: Publication) -> bool {
        self.events.send(Event::Publish(publication)).is_ok()
    }

    /// Queues an admit and waits until the dispatcher has processed it
    pub async fn admit(&self, candidate: Candidate) -> Admission {
        let (reply, response) = oneshot::channel();

        if self.events.send(Event::Admit { candidate, reply }).is_err() {
            warn!("Dispatcher is gone, cannot admit new session");
            return Admission::Rejected;
        }

        response.await.unwrap_or(Admission::Rejected)
    }

    pub fn evict(&self, id: SessionId) {
        if self.events.send(Event::Evict { id }).is_err() {
            debug!("Dispatcher is gone, dropping evict for {}", id);
        }
    }
}

/// Owner of the session registry
pub struct Dispatcher {
    registry: SessionRegistry,
    events: mpsc::UnboundedReceiver<Event>,
}

impl Dispatcher {
    pub fn new() -> (Self, DispatcherHandle) {
        let (tx, rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher {
            registry: SessionRegistry::new(),
            events: rx,
        };

        (dispatcher, DispatcherHandle { events: tx })
    }

    /// Spawns the event loop on the runtime and returns its handle
    pub fn spawn() -> DispatcherHandle {
        let (dispatcher, handle) = Self::new();
        tokio::spawn(dispatcher.run());
        handle
    }

    /// Drains events until every handle has been dropped
    pub async fn run(mut self) {
        info!("Dispatcher started");

        while let Some(event) = self.events.recv().await {
            self.handle_event(event);
        }

        info!("Dispatcher stopped, {} sessions left", self.registry.len());
    }

    /// Applies one event to the registry and every affected queue
    ///
    /// Never awaits: all socket output goes through per-session queues.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Publish(publication) => self.publish(publication),
            Event::Admit { candidate, reply } => {
                let admission = self.admit(candidate);
                // The handler may have gone away while waiting
                let _ = reply.send(admission);
            }
            Event::Evict { id } => self.evict(id),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub(crate) fn try_next_event(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    fn publish(&self, publication: Publication) {
        let color = publication
            .sender()
            .and_then(|sender| self.registry.color_of(sender))
            .unwrap_or(NEUTRAL);

        let line = format_publication(&publication, color);
        self.broadcast(&line);
    }

    fn admit(&mut self, candidate: Candidate) -> Admission {
        let (name, color, outbound) = match self.registry.admit(candidate) {
            Ok(session) => (
                session.name.clone(),
                session.color,
                session.outbound.clone(),
            ),
            Err((err, candidate)) => {
                info!("Rejecting session {}: {}", candidate.id, err);
                deliver(
                    &candidate.outbound,
                    &candidate.name,
                    ServerLine::UsernameTaken.to_string(),
                );
                // Dropping the candidate releases its queue so the writer closes
                return Admission::Rejected;
            }
        };

        self.broadcast(&format_join(&name, color));
        deliver(
            &outbound,
            &name,
            ServerLine::ColorAssign {
                tag: color.to_string(),
            }
            .to_string(),
        );

        Admission::Admitted { color }
    }

    fn evict(&mut self, id: SessionId) {
        match self.registry.evict(id) {
            Some(session) => {
                // Drop our sender first so the writer can finish once drained
                drop(session.outbound);
                self.broadcast(&format_leave(&session.name));
            }
            None => debug!("Ignoring evict for unknown session {}", id),
        }
    }

    /// Enqueues a line for every session in the current snapshot
    fn broadcast(&self, line: &str) {
        debug!(
            "Broadcasting to {} sessions: {}",
            self.registry.len(),
            line
        );

        for session in self.registry.snapshot() {
            deliver(&session.outbound, &session.name, line.to_string());
        }
    }
}

/// Non-blocking enqueue; failures only ever affect the one session
fn deliver(outbound: &mpsc::Sender<String>, name: &str, line: String) {
    match outbound.try_send(line) {
        Ok(()) => {}
        Err(TrySendError::Full(line)) => {
            warn!("Outbound queue full for '{}', dropping line: {}", name, line);
        }
        Err(TrySendError::Closed(_)) => {
            debug!("Outbound queue closed for '{}', evict pending", name);
        }
    }
}
