use chat_server::config::ServerConfig;
use chat_server::network::ChatServer;
use chat_server::utils::{connection_hints, local_ip};
use chat_server::writer::DEFAULT_QUEUE_CAPACITY;
use chat_shared::DEFAULT_PORT;
use clap::Parser;
use log::info;
use std::time::Duration;

/// Main-method of the application.
/// Parses command-line arguments, binds the listener and serves until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Interface to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[clap(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Seconds between liveness pings
        #[clap(long, default_value = "5")]
        heartbeat_secs: u64,
        /// Lines buffered per client before output to it is dropped
        #[clap(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
        queue_capacity: usize,
    }

    let args = Args::parse();

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        heartbeat_interval: Duration::from_secs(args.heartbeat_secs.max(1)),
        queue_capacity: args.queue_capacity,
    };

    let server = ChatServer::bind(config).await?;

    for hint in connection_hints(server.local_addr()?, local_ip()) {
        info!("{}", hint);
        println!("{}", hint);
    }

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
