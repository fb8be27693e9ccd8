//! Per-connection handler
//!
//! Each accepted socket runs one handler task through
//! `Handshaking -> Active -> Closed`. The handler only reads: everything it
//! wants written goes into the connection's outbound queue, either directly
//! (command replies) or through the dispatcher (broadcasts).

use crate::dispatcher::{Admission, DispatcherHandle};
use crate::format::Publication;
use crate::registry::{Candidate, SessionId};
use crate::writer::spawn_writer;
use chat_shared::{is_directive_line, ClientCommand};
use log::{debug, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Handshaking,
    Active,
    Closed,
}

pub struct Connection<R> {
    id: SessionId,
    label: String,
    name: Option<String>,
    lines: Lines<R>,
    outbound: mpsc::Sender<String>,
    dispatcher: DispatcherHandle,
    state: ConnectionState,
}

impl<R> Connection<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(
        id: SessionId,
        label: String,
        reader: R,
        outbound: mpsc::Sender<String>,
        dispatcher: DispatcherHandle,
    ) -> Self {
        Self {
            id,
            label,
            name: None,
            lines: reader.lines(),
            outbound,
            dispatcher,
            state: ConnectionState::Handshaking,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Drives the connection until it closes
    pub async fn run(&mut self) {
        let name = match self.handshake().await {
            Some(name) => name,
            None => {
                self.state = ConnectionState::Closed;
                return;
            }
        };

        let candidate = Candidate {
            id: self.id,
            name: name.clone(),
            outbound: self.outbound.clone(),
        };

        match self.dispatcher.admit(candidate).await {
            Admission::Admitted { color } => {
                info!("'{}' joined from {} with color {}", name, self.label, color);
                self.name = Some(name);
                self.state = ConnectionState::Active;
            }
            Admission::Rejected => {
                // Never admitted, so there is nothing to evict
                info!("Closing {}: username '{}' is taken", self.label, name);
                self.state = ConnectionState::Closed;
                return;
            }
        }

        self.serve().await;

        self.dispatcher.evict(self.id);
        self.state = ConnectionState::Closed;
    }

    /// Reads the first line as the requested display name
    async fn handshake(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                let name = line.trim().to_string();
                debug!("{} requested name '{}'", self.label, name);
                Some(name)
            }
            Ok(None) => {
                debug!("{} closed before sending a username", self.label);
                None
            }
            Err(e) => {
                warn!("Error during username read from {}: {}", self.label, e);
                None
            }
        }
    }

    async fn serve(&mut self) {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("{} disconnected", self.display_name());
                    return;
                }
                Err(e) => {
                    warn!("Error reading from {}: {}", self.display_name(), e);
                    return;
                }
            };

            let line = line.trim();
            debug!("Received from {}: {}", self.display_name(), line);

            if is_directive_line(line) {
                warn!(
                    "Dropping directive sent by {}: {}",
                    self.display_name(),
                    line
                );
                continue;
            }

            if let Some(command) = ClientCommand::detect(line) {
                if !self.reply(command).await {
                    return;
                }
                continue;
            }

            if !self.dispatcher.publish(Publication::from_line(line)) {
                warn!("Dispatcher stopped, closing {}", self.display_name());
                return;
            }
        }
    }

    /// Answers a command on this connection only, bypassing broadcast
    async fn reply(&self, command: ClientCommand) -> bool {
        debug!("Answering {:?} for {}", command, self.display_name());

        self.outbound
            .send(command.response().to_string())
            .await
            .is_ok()
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.label)
    }
}

/// Runs the full lifecycle of an accepted socket
pub async fn handle_connection(
    stream: TcpStream,
    id: SessionId,
    dispatcher: DispatcherHandle,
    queue_capacity: usize,
) {
    let label = match stream.peer_addr() {
        Ok(addr) => format!("{} ({})", id, addr),
        Err(_) => id.to_string(),
    };

    let (read_half, write_half) = stream.into_split();
    let (outbound, _writer) = spawn_writer(
        write_half,
        queue_capacity,
        id,
        dispatcher.clone(),
        label.clone(),
    );

    let mut connection = Connection::new(
        id,
        label,
        BufReader::new(read_half),
        outbound,
        dispatcher,
    );
    connection.run().await;
}
