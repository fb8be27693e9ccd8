//! Listener and accept loop

use crate::config::ServerConfig;
use crate::connection::handle_connection;
use crate::dispatcher::Dispatcher;
use crate::error::ChatError;
use crate::heartbeat::run_heartbeat;
use crate::registry::SessionId;
use log::{error, info};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// Chat server bound to a TCP port
pub struct ChatServer {
    listener: TcpListener,
    config: ServerConfig,
}

impl ChatServer {
    /// Binds the listener; a failure here is fatal for the process
    pub async fn bind(config: ServerConfig) -> Result<Self, ChatError> {
        let addr = config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ChatError::Startup {
                addr: addr.clone(),
                source,
            })?;

        info!("Server listening on {}", addr);
        Ok(ChatServer { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ChatError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever
    ///
    /// Spawns the dispatcher and heartbeat, then one handler task per
    /// accepted socket. Accept errors are logged and never stop the loop.
    pub async fn run(self) {
        let dispatcher = Dispatcher::spawn();
        tokio::spawn(run_heartbeat(
            dispatcher.clone(),
            self.config.heartbeat_interval,
        ));

        let mut next_session_id = 1;

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let id = SessionId(next_session_id);
                    next_session_id += 1;

                    info!("Accepted connection {} from {}", id, addr);
                    tokio::spawn(handle_connection(
                        stream,
                        id,
                        dispatcher.clone(),
                        self.config.queue_capacity,
                    ));
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}
