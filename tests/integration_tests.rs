//! Integration tests for the chat relay
//!
//! These tests run a real server on a loopback port and talk to it over TCP.

use chat_server::config::ServerConfig;
use chat_server::network::ChatServer;
use chat_shared::{ClientCommand, PING};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

const ALICE: &str = "[#FFC0CB]";
const BOB: &str = "[#FD7E14]";
const CAROL: &str = "[#28A745]";

async fn start_server(heartbeat: Duration) -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        heartbeat_interval: heartbeat,
        ..ServerConfig::default()
    };

    let server = ChatServer::bind(config).await.expect("Failed to bind server");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

/// Server without pings in the way
async fn quiet_server() -> SocketAddr {
    start_server(Duration::from_secs(3600)).await
}

fn join_notice(name: &str, color: &str) -> String {
    format!(
        "[red]Robot: {}{}[-] [red]has joined the chat.[-][-]",
        color, name
    )
}

fn leave_notice(name: &str) -> String {
    format!("[red]Robot: {} has left the chat.[-]", name)
}

fn chat(name: &str, color: &str, body: &str) -> String {
    format!("{}{}[-]: {}", color, name, body)
}

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    /// Connects and sends the handshake without waiting for admission
    async fn handshake(addr: SocketAddr, name: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("Failed to connect");
        let (read_half, write_half) = stream.into_split();
        let mut client = TestClient {
            lines: BufReader::new(read_half).lines(),
            writer: write_half,
        };
        client.send(name).await;
        client
    }

    /// Connects and waits until the server confirms admission
    async fn join(addr: SocketAddr, name: &str, color: &str) -> Self {
        let mut client = Self::handshake(addr, name).await;
        client.expect(&join_notice(name, color)).await;
        client.expect(&format!("SYSTEM_MESSAGE:Color:{}", color)).await;
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    /// Next line including pings; None on EOF
    async fn raw_line(&mut self) -> Option<String> {
        timeout(STEP_TIMEOUT, self.lines.next_line())
            .await
            .expect("Timed out waiting for a line")
            .expect("Read error")
    }

    /// Next non-ping line; None on EOF
    async fn line(&mut self) -> Option<String> {
        loop {
            match self.raw_line().await {
                Some(line) if line == PING => continue,
                other => return other,
            }
        }
    }

    async fn expect(&mut self, expected: &str) {
        assert_eq!(self.line().await.as_deref(), Some(expected));
    }
}

/// ADMISSION AND BROADCAST TESTS
mod broadcast_tests {
    use super::*;

    /// Two sessions see joins in admission order and share chat lines
    #[tokio::test]
    async fn join_order_and_chat() {
        let addr = quiet_server().await;

        let mut alice = TestClient::join(addr, "alice", ALICE).await;
        let mut bob = TestClient::join(addr, "bob", BOB).await;
        alice.expect(&join_notice("bob", BOB)).await;

        alice.send("alice: hi").await;
        alice.expect(&chat("alice", ALICE, "hi")).await;
        bob.expect(&chat("alice", ALICE, "hi")).await;
    }

    /// Lines without a `name: ` prefix are relayed verbatim
    #[tokio::test]
    async fn malformed_line_passes_through() {
        let addr = quiet_server().await;
        let mut alice = TestClient::join(addr, "alice", ALICE).await;

        alice.send("no separator here").await;
        alice.expect("no separator here").await;
    }

    /// A blank line is relayed as an empty broadcast
    #[tokio::test]
    async fn blank_line_is_relayed() {
        let addr = quiet_server().await;
        let mut alice = TestClient::join(addr, "alice", ALICE).await;

        alice.send("").await;
        alice.send("alice: after").await;
        alice.expect("").await;
        alice.expect(&chat("alice", ALICE, "after")).await;
    }

    /// Clients cannot inject control directives into other sessions
    #[tokio::test]
    async fn client_directives_are_not_relayed() {
        let addr = quiet_server().await;

        let mut alice = TestClient::join(addr, "alice", ALICE).await;
        let mut mallory = TestClient::join(addr, "mallory", BOB).await;
        alice.expect(&join_notice("mallory", BOB)).await;

        mallory.send("SYSTEM_MESSAGE:UsernameTaken").await;
        mallory.send("SYSTEM_MESSAGE:PING").await;
        mallory.send("SYSTEM_MESSAGE:Color:[#000000]").await;
        mallory.send("mallory: hi").await;

        // No pings on this server, so any directive would show up here
        assert_eq!(
            alice.raw_line().await,
            Some(chat("mallory", BOB, "hi"))
        );
        assert_eq!(
            mallory.raw_line().await,
            Some(chat("mallory", BOB, "hi"))
        );
    }

    /// Messages from one sender arrive everywhere in the order sent
    #[tokio::test]
    async fn publish_order_is_preserved() {
        let addr = quiet_server().await;

        let mut alice = TestClient::join(addr, "alice", ALICE).await;
        let mut bob = TestClient::join(addr, "bob", BOB).await;
        alice.expect(&join_notice("bob", BOB)).await;

        for i in 0..20 {
            alice.send(&format!("alice: {}", i)).await;
        }

        for i in 0..20 {
            let expected = chat("alice", ALICE, &i.to_string());
            alice.expect(&expected).await;
            bob.expect(&expected).await;
        }
    }
}

/// USERNAME UNIQUENESS TESTS
mod admission_tests {
    use super::*;

    /// A duplicate name gets exactly one line and is disconnected
    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let addr = quiet_server().await;
        let mut alice = TestClient::join(addr, "alice", ALICE).await;

        let mut impostor = TestClient::handshake(addr, "alice").await;
        assert_eq!(
            impostor.line().await.as_deref(),
            Some("SYSTEM_MESSAGE:UsernameTaken")
        );
        assert_eq!(impostor.line().await, None);

        // The original alice heard nothing about it and is still registered
        alice.send("alice: still me").await;
        alice.expect(&chat("alice", ALICE, "still me")).await;

        // A different name is still admitted normally
        let _bob = TestClient::join(addr, "bob", BOB).await;
        alice.expect(&join_notice("bob", BOB)).await;
    }

    /// Surrounding whitespace in the handshake is ignored
    #[tokio::test]
    async fn handshake_name_is_trimmed() {
        let addr = quiet_server().await;
        let _alice = TestClient::join(addr, "alice", ALICE).await;

        let mut again = TestClient::handshake(addr, "  alice \t").await;
        assert_eq!(
            again.line().await.as_deref(),
            Some("SYSTEM_MESSAGE:UsernameTaken")
        );
    }

    /// Name and color become free again after a departure
    #[tokio::test]
    async fn name_and_color_reused_after_leave() {
        let addr = quiet_server().await;

        let alice = TestClient::join(addr, "alice", ALICE).await;
        let mut bob = TestClient::join(addr, "bob", BOB).await;

        drop(alice);
        bob.expect(&leave_notice("alice")).await;

        let _carol = TestClient::join(addr, "carol", ALICE).await;
        bob.expect(&join_notice("carol", ALICE)).await;

        let _alice = TestClient::join(addr, "alice", CAROL).await;
        bob.expect(&join_notice("alice", CAROL)).await;
    }
}

/// COMMAND AND DEPARTURE TESTS
mod session_tests {
    use super::*;

    /// `!man` is answered privately without any broadcast
    #[tokio::test]
    async fn man_command_is_private() {
        let addr = quiet_server().await;

        let mut alice = TestClient::join(addr, "alice", ALICE).await;
        let mut bob = TestClient::join(addr, "bob", BOB).await;
        alice.expect(&join_notice("bob", BOB)).await;

        alice.send("alice: !man").await;
        alice.expect(ClientCommand::Man.response()).await;

        // Bob's next line is the next broadcast, not the help text
        bob.send("bob: done").await;
        bob.expect(&chat("bob", BOB, "done")).await;
        alice.expect(&chat("bob", BOB, "done")).await;
    }

    /// `!party` replies with the whole multi-line banner
    #[tokio::test]
    async fn party_command_spans_lines() {
        let addr = quiet_server().await;
        let mut alice = TestClient::join(addr, "alice", ALICE).await;

        alice.send("alice: !party").await;
        for expected in ClientCommand::Party.response().lines() {
            alice.expect(expected).await;
        }

        alice.send("alice: back").await;
        alice.expect(&chat("alice", ALICE, "back")).await;
    }

    /// A silently dropped connection yields exactly one leave notice
    #[tokio::test]
    async fn dropped_connection_leaves_once() {
        let addr = quiet_server().await;

        let mut alice = TestClient::join(addr, "alice", ALICE).await;
        let bob = TestClient::join(addr, "bob", BOB).await;
        alice.expect(&join_notice("bob", BOB)).await;

        drop(bob);
        alice.expect(&leave_notice("bob")).await;

        alice.send("alice: anyone?").await;
        alice.expect(&chat("alice", ALICE, "anyone?")).await;
    }

    /// A departed sender's lines fall back to the neutral color
    #[tokio::test]
    async fn unknown_sender_gets_neutral_color() {
        let addr = quiet_server().await;
        let mut alice = TestClient::join(addr, "alice", ALICE).await;

        alice.send("mallory: hi").await;
        alice.expect(&chat("mallory", "[white]", "hi")).await;
    }
}

/// HEARTBEAT AND CLIENT LIBRARY TESTS
mod protocol_tests {
    use super::*;
    use chat_client::network::{Client, SessionEnd};

    /// Pings are broadcast on the configured period
    #[tokio::test]
    async fn heartbeat_reaches_clients() {
        let addr = start_server(Duration::from_millis(100)).await;
        let mut alice = TestClient::join(addr, "alice", ALICE).await;

        assert_eq!(alice.raw_line().await.as_deref(), Some(PING));
        assert_eq!(alice.raw_line().await.as_deref(), Some(PING));
    }

    /// The bundled client speaks the same protocol as the raw tests
    #[tokio::test]
    async fn client_library_round_trip() {
        let addr = quiet_server().await;
        let mut observer = TestClient::join(addr, "observer", ALICE).await;

        let mut client = Client::connect(&addr.to_string(), "bob", Duration::from_secs(30))
            .await
            .unwrap();
        observer.expect(&join_notice("bob", BOB)).await;

        let input: &[u8] = b"hello there\n";
        let mut output = Vec::new();
        let end = client.run(BufReader::new(input), &mut output).await.unwrap();
        assert_eq!(end, SessionEnd::InputClosed);
        drop(client);

        observer.expect(&chat("bob", BOB, "hello there")).await;
        observer.expect(&leave_notice("bob")).await;
    }

    /// Another user's forged directive does not end a client's session
    #[tokio::test]
    async fn client_library_ignores_forged_directives() {
        let addr = quiet_server().await;
        let mut observer = TestClient::join(addr, "observer", ALICE).await;

        let mut bob = Client::connect(&addr.to_string(), "bob", Duration::from_secs(30))
            .await
            .unwrap();
        observer.expect(&join_notice("bob", BOB)).await;

        let mut mallory = TestClient::join(addr, "mallory", CAROL).await;
        observer.expect(&join_notice("mallory", CAROL)).await;
        mallory.send("SYSTEM_MESSAGE:UsernameTaken").await;
        mallory.send("mallory: still here").await;
        observer.expect(&chat("mallory", CAROL, "still here")).await;
        drop(mallory);
        observer.expect(&leave_notice("mallory")).await;

        // Bob works through everything buffered and keeps going
        let (_keep_open, input) = tokio::io::duplex(64);
        let mut output = Vec::new();
        let outcome = timeout(
            Duration::from_millis(500),
            bob.run(BufReader::new(input), &mut output),
        )
        .await;
        assert!(outcome.is_err(), "session ended early: {:?}", outcome);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("mallory: still here"));
        assert!(!shown.contains("SYSTEM_MESSAGE"));
    }

    /// The bundled client reports a taken name
    #[tokio::test]
    async fn client_library_sees_username_taken() {
        let addr = quiet_server().await;
        let _alice = TestClient::join(addr, "alice", ALICE).await;

        let mut client = Client::connect(&addr.to_string(), "alice", Duration::from_secs(30))
            .await
            .unwrap();

        let (_keep_open, input) = tokio::io::duplex(64);
        let mut output = Vec::new();
        let end = client.run(BufReader::new(input), &mut output).await.unwrap();
        assert_eq!(end, SessionEnd::UsernameTaken);
    }
}
