//! Courier integration test harness.
//!
//! Tests here exercise the crates together against a throwaway HTTP server
//! bound to 127.0.0.1 on an ephemeral port:
//!
//!   cargo test --test integration
//!
//! Every test starts its own server, so tests can run in parallel. Set
//! `RUST_LOG=debug` to see dispatcher and observer logs.

use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// ── Harness ───────────────────────────────────────────────────────────────────

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

static TRACING: Once = Once::new();

/// Route `tracing` output through the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Start a minimal HTTP/1.1 server. Routes:
///
/// - `/json`: `{"x":1}` as `application/json`
/// - `/text`: `hello` as `text/plain`
/// - `/slow`: like `/text`, after [`SLOW_DELAY`]
/// - anything else: 404
pub async fn spawn_server() -> Result<SocketAddr> {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test server")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream));
        }
    });
    Ok(addr)
}

async fn serve(mut stream: TcpStream) {
    let mut buf = vec![0u8; 8192];
    let mut read = 0;
    loop {
        match stream.read(&mut buf[read..]).await {
            Ok(0) | Err(_) => return,
            Ok(n) => read += n,
        }
        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
            break;
        }
    }

    let head = String::from_utf8_lossy(&buf[..read]);
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

    let (status, content_type, body) = match path.as_str() {
        "/json" => ("200 OK", "application/json", r#"{"x":1}"#),
        "/text" => ("200 OK", "text/plain", "hello"),
        "/slow" => {
            tokio::time::sleep(SLOW_DELAY).await;
            ("200 OK", "text/plain", "hello")
        }
        _ => ("404 Not Found", "text/plain", "not found"),
    };

    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// A client that never routes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("failed to build test client")
}

/// A GET request for `path` on the test server.
pub fn get(client: &reqwest::Client, addr: SocketAddr, path: &str) -> reqwest::Request {
    client
        .get(format!("http://{addr}{path}"))
        .build()
        .expect("failed to build request")
}

// ── Test modules ──────────────────────────────────────────────────────────────

mod content;
mod messaging;
