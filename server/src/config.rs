use crate::writer::DEFAULT_QUEUE_CAPACITY;
use chat_shared::{DEFAULT_PORT, HEARTBEAT_INTERVAL};
use std::time::Duration;

/// Runtime settings for the chat server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to listen on
    pub host: String,
    pub port: u16,
    /// Period of the liveness marker
    pub heartbeat_interval: Duration,
    /// Lines buffered per session before output to it is dropped
    pub queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            heartbeat_interval: HEARTBEAT_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
