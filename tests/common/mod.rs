//! Shared utilities for integration tests: scripted upstreams and a relay
//! booted on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use http_relay::config::RelayConfig;
use http_relay::http::HttpServer;
use http_relay::lifecycle::Shutdown;

pub const USER: &str = "tester";
pub const PASS: &str = "s3cret:with-colon";

/// A request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    /// Request line and headers, header names lowercased.
    pub head: String,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head
            .lines()
            .find(|line| line.starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }
}

/// Handle to a running mock upstream.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Captured>>>,
    hits: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Captured {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("upstream received no request")
    }
}

/// Build a raw HTTP/1.1 response. `Content-Length` is added unless a framing
/// header is already present; `Connection: close` is always added.
pub fn http_response(status_line: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {}\r\n", status_line);
    let framed = headers.iter().any(|(name, _)| {
        name.eq_ignore_ascii_case("content-length") || name.eq_ignore_ascii_case("transfer-encoding")
    });
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    if !framed {
        out.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    out.push_str("Connection: close\r\n\r\n");
    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

async fn read_request(socket: &mut TcpStream) -> Option<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head_raw = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let head: String = head_raw
        .lines()
        .enumerate()
        .map(|(i, line)| match (i, line.split_once(':')) {
            (0, _) | (_, None) => line.to_string(),
            (_, Some((name, value))) => format!("{}:{}", name.to_ascii_lowercase(), value),
        })
        .collect::<Vec<_>>()
        .join("\r\n");

    let mut body = buf[head_end + 4..].to_vec();
    let content_length = Captured {
        head: head.clone(),
        body: Vec::new(),
    }
    .header("content-length")
    .and_then(|v| v.parse::<usize>().ok())
    .unwrap_or(0);
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(Captured { head, body })
}

/// Start an upstream that answers every request with `response` verbatim.
pub async fn start_upstream(response: Vec<u8>) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = MockUpstream {
        addr: listener.local_addr().unwrap(),
        requests: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let response = Arc::new(response);
    let handle = upstream.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handle = handle.clone();
            let response = response.clone();
            tokio::spawn(async move {
                if let Some(captured) = read_request(&mut socket).await {
                    handle.hits.fetch_add(1, Ordering::SeqCst);
                    handle.requests.lock().unwrap().push(captured);
                    let _ = socket.write_all(&response).await;
                    let _ = socket.shutdown().await;
                }
            });
        }
    });

    upstream
}

/// Start an upstream that sends a chunked 206 and keeps producing 1 KiB
/// chunks until the peer goes away, then sets the returned flag.
pub async fn start_endless_upstream() -> (MockUpstream, Arc<AtomicBool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = MockUpstream {
        addr: listener.local_addr().unwrap(),
        requests: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let disconnected = Arc::new(AtomicBool::new(false));
    let handle = upstream.clone();
    let flag = disconnected.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handle = handle.clone();
            let flag = flag.clone();
            tokio::spawn(async move {
                let Some(captured) = read_request(&mut socket).await else {
                    return;
                };
                handle.hits.fetch_add(1, Ordering::SeqCst);
                handle.requests.lock().unwrap().push(captured);

                let head = "HTTP/1.1 206 Partial Content\r\nContent-Type: application/octet-stream\r\nTransfer-Encoding: chunked\r\n\r\n";
                if socket.write_all(head.as_bytes()).await.is_err() {
                    flag.store(true, Ordering::SeqCst);
                    return;
                }
                let mut frame = b"400\r\n".to_vec();
                frame.extend_from_slice(&[b'z'; 1024]);
                frame.extend_from_slice(b"\r\n");
                loop {
                    if socket.write_all(&frame).await.is_err() {
                        flag.store(true, Ordering::SeqCst);
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            });
        }
    });

    (upstream, disconnected)
}

/// Relay configuration using the test credentials.
pub fn relay_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.auth.credentials = format!("{USER}:{PASS}");
    config.upstream.use_system_proxy = false;
    config
}

/// Boot a relay on an ephemeral port. Drop or trigger the returned
/// `Shutdown` to stop it.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
