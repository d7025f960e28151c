//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use images3_gateway::config::{ConfReference, GatewayConfig};

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request line (e.g. `GET /health HTTP/1.1`) and returns
/// the status code and JSON body to answer with.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]);
                        let request_line = request.lines().next().unwrap_or_default().to_string();

                        let (status, body) = f(request_line).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            409 => "409 Conflict",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Settings files for the three backend identifiers, kept alive with the tempdir.
pub struct Fixture {
    pub dir: TempDir,
    pub config: GatewayConfig,
}

/// Write `images3.conf`, `imageprocessor.conf` and `mongodb.conf` pointing at
/// `endpoint`, plus a `404.html` page, and return a config referencing them.
pub fn fixture(endpoint: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "images3.toml",
        &format!("endpoint = \"{endpoint}\"\nrequest_timeout_secs = 2\n"),
    );
    write(
        root,
        "imageprocessor.toml",
        &format!("working_dir = \"{}\"\n", root.join("work").display()),
    );
    write(
        root,
        "mongodb.toml",
        "url = \"mongodb://localhost:27017\"\ndatabase = \"images3\"\n",
    );
    write(root, "404.html", "<h1>Not found</h1>");

    let mut config = GatewayConfig {
        images3: ConfReference::new(root.join("images3.toml").display().to_string()),
        imageprocessor: ConfReference::new(root.join("imageprocessor.toml").display().to_string()),
        mongodb: ConfReference::new(root.join("mongodb.toml").display().to_string()),
        ..GatewayConfig::default()
    };
    config.assets.static_dir = root.display().to_string();
    config.provisioning.startup_timeout_secs = 5;

    Fixture { dir, config }
}

fn write(root: &Path, name: &str, content: &str) {
    std::fs::write(root.join(name), content).unwrap();
}
