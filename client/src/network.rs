use crate::display::strip_tags;
use chat_shared::{compose_chat, ServerLine};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines,
};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{sleep_until, Instant};

/// Why a chat session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    UsernameTaken,
    ServerClosed,
    /// No ping within the watchdog window
    ServerSilent,
    InputClosed,
}

impl SessionEnd {
    pub fn message(&self) -> &'static str {
        match self {
            SessionEnd::UsernameTaken => {
                "Username already taken. Please restart the client and choose a different username."
            }
            SessionEnd::ServerClosed => "Server closed the connection.",
            SessionEnd::ServerSilent => "No heartbeat from the server, it appears to be down.",
            SessionEnd::InputClosed => "Input closed, leaving the chat.",
        }
    }
}

pub struct Client<R, W> {
    username: String,
    server_lines: Lines<R>,
    server_writer: W,
    color: Option<String>,
    watchdog: Duration,
    last_ping: Instant,
}

impl Client<BufReader<OwnedReadHalf>, OwnedWriteHalf> {
    /// Connects to the server and performs the username handshake
    pub async fn connect(
        server_addr: &str,
        username: &str,
        watchdog: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Connecting to {}...", server_addr);
        let stream = TcpStream::connect(server_addr).await?;
        let (read_half, write_half) = stream.into_split();

        let mut client = Client::new(username, BufReader::new(read_half), write_half, watchdog);
        client.handshake().await?;

        Ok(client)
    }
}

impl<R, W> Client<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(username: &str, reader: R, writer: W, watchdog: Duration) -> Self {
        Client {
            username: username.to_string(),
            server_lines: reader.lines(),
            server_writer: writer,
            color: None,
            watchdog,
            last_ping: Instant::now(),
        }
    }

    /// Color tag the server assigned, once announced
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub async fn handshake(&mut self) -> std::io::Result<()> {
        let name = self.username.clone();
        self.send_line(&name).await
    }

    /// Sends typed text as a chat line; blank input is ignored
    pub async fn send_message(&mut self, text: &str) -> std::io::Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let line = compose_chat(&self.username, text);
        self.send_line(&line).await
    }

    async fn send_line(&mut self, line: &str) -> std::io::Result<()> {
        self.server_writer.write_all(line.as_bytes()).await?;
        self.server_writer.write_all(b"\n").await?;
        self.server_writer.flush().await
    }

    /// Relays between the server, `input` and `output` until something ends it
    pub async fn run<I, O>(
        &mut self,
        input: I,
        output: &mut O,
    ) -> Result<SessionEnd, Box<dyn std::error::Error>>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let mut input_lines = input.lines();
        self.last_ping = Instant::now();

        loop {
            let deadline = self.last_ping + self.watchdog;

            tokio::select! {
                result = self.server_lines.next_line() => {
                    let line = match result? {
                        Some(line) => line,
                        None => return Ok(SessionEnd::ServerClosed),
                    };

                    if let Some(end) = self.handle_server_line(&line, output).await? {
                        return Ok(end);
                    }
                },

                result = input_lines.next_line() => {
                    match result? {
                        Some(text) => self.send_message(&text).await?,
                        None => return Ok(SessionEnd::InputClosed),
                    }
                },

                _ = sleep_until(deadline) => {
                    warn!("No ping for {:?}", self.watchdog);
                    return Ok(SessionEnd::ServerSilent);
                },
            }
        }
    }

    async fn handle_server_line<O>(
        &mut self,
        line: &str,
        output: &mut O,
    ) -> std::io::Result<Option<SessionEnd>>
    where
        O: AsyncWrite + Unpin,
    {
        match ServerLine::parse(line) {
            ServerLine::UsernameTaken => return Ok(Some(SessionEnd::UsernameTaken)),
            ServerLine::ColorAssign { tag } => {
                info!("Server assigned color {}", tag);
                self.color = Some(tag);
            }
            ServerLine::Ping => {
                debug!("Ping");
                self.last_ping = Instant::now();
            }
            ServerLine::Display(text) => {
                let mut rendered = strip_tags(&text);
                rendered.push('\n');
                output.write_all(rendered.as_bytes()).await?;
                output.flush().await?;
            }
        }

        Ok(None)
    }
}
