//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image_relay::config::RelayConfig;
use image_relay::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned upstream answer.
#[derive(Clone)]
pub struct MockReply {
    pub status_line: &'static str,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl MockReply {
    pub fn image(content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status_line: "200 OK",
            content_type: Some(content_type),
            body: body.to_vec(),
            delay: Duration::ZERO,
        }
    }

    #[allow(dead_code)]
    pub fn status(status_line: &'static str) -> Self {
        Self {
            status_line,
            content_type: Some("text/plain"),
            body: status_line.as_bytes().to_vec(),
            delay: Duration::ZERO,
        }
    }
}

/// Request heads seen by a mock upstream, lowercased.
pub type SeenRequests = Arc<Mutex<Vec<String>>>;

/// Start a mock upstream on an ephemeral loopback port.
pub async fn start_mock_upstream(reply: MockReply) -> (SocketAddr, SeenRequests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: SeenRequests = Arc::new(Mutex::new(Vec::new()));
    let seen_task = seen.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let reply = reply.clone();
                    let seen = seen_task.clone();
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }
                        seen.lock()
                            .unwrap()
                            .push(String::from_utf8_lossy(&head).to_lowercase());

                        tokio::time::sleep(reply.delay).await;

                        let mut response = format!("HTTP/1.1 {}\r\n", reply.status_line);
                        if let Some(ct) = reply.content_type {
                            response.push_str(&format!("Content-Type: {}\r\n", ct));
                        }
                        response.push_str(&format!(
                            "Content-Length: {}\r\nConnection: close\r\n\r\n",
                            reply.body.len()
                        ));

                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.write_all(&reply.body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

/// A loopback address with nothing listening on it.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Relay config that allows loopback upstreams.
pub fn loopback_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upstream.allowed_hosts = vec!["127.0.0.1".into()];
    config
}

/// Start a relay on an ephemeral port. Keep the returned `Shutdown` alive.
pub async fn spawn_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(config.listener.bind_address()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
