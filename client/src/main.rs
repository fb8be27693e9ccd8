use chat_client::network::Client;
use chat_shared::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use log::info;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// IP address of the server to connect to
    #[arg(short = 'i', long, default_value = DEFAULT_HOST)]
    ip: String,

    /// Port of the server to connect to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Display name; asked for interactively when omitted
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Seconds without a server ping before giving up
    #[arg(long, default_value = "15")]
    watchdog_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let mut stdin = BufReader::new(tokio::io::stdin());

    let username = match args.username {
        Some(name) => name.trim().to_string(),
        None => prompt_username(&mut stdin).await?,
    };
    if username.is_empty() {
        return Err("a username is required".into());
    }

    let server_addr = format!("{}:{}", args.ip, args.port);
    info!("Joining {} as '{}'", server_addr, username);

    let watchdog = Duration::from_secs(args.watchdog_secs.max(1));
    let mut client = Client::connect(&server_addr, &username, watchdog).await?;

    let mut stdout = tokio::io::stdout();
    let end = client.run(stdin, &mut stdout).await?;

    eprintln!("{}", end.message());
    Ok(())
}

async fn prompt_username<R>(input: &mut R) -> Result<String, Box<dyn std::error::Error>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter your username: ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(line.trim().to_string())
}
