//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use httpgate::config::{FileConfig, ListenerConfig, ServerConfig};
use httpgate::net::{AdmissionController, Listener};
use httpgate::{HttpServer, Router, ServiceKind, Shutdown};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// A server running on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub admission: AdmissionController,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn config_with(base: &Path, max_connections: usize) -> ServerConfig {
    ServerConfig {
        listener: ListenerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_connections,
        },
        files: FileConfig {
            base_dir: base.to_path_buf(),
            ..FileConfig::default()
        },
        ..ServerConfig::default()
    }
}

/// Bind `config` on an ephemeral port and run the accept loop in the background.
pub async fn start_server(kind: ServiceKind, config: ServerConfig) -> TestServer {
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr();
    let router = Router::from_config(kind, &config);
    let server = HttpServer::new(config, router);
    let admission = server.admission();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(server.run(listener, rx));

    TestServer {
        addr,
        admission,
        shutdown,
    }
}

pub async fn start_file_server(base: &Path) -> TestServer {
    start_server(ServiceKind::FileServer, config_with(base, 10)).await
}

pub async fn start_proxy() -> TestServer {
    let base = std::env::temp_dir();
    start_server(ServiceKind::Proxy, config_with(&base, 10)).await
}

/// Send `raw` on a fresh connection, half-close, and read until the server
/// closes it.
pub async fn send_raw(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out))
        .await
        .expect("server did not close the connection")
        .unwrap();
    out
}

pub async fn send_raw_text(addr: SocketAddr, raw: &str) -> String {
    String::from_utf8(send_raw(addr, raw.as_bytes()).await).unwrap()
}

/// One-shot origin: captures the request it receives (head plus any
/// `Content-Length` body), replies with `response` verbatim and closes.
pub async fn start_origin(response: &'static [u8]) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);
        let mut request = String::new();
        let mut body_len = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await.unwrap() == 0 {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    body_len = value.trim().parse().unwrap();
                }
            }
            request.push_str(&line);
            if line == "\r\n" {
                break;
            }
        }
        let mut body = vec![0; body_len];
        reader.read_exact(&mut body).await.unwrap();
        request.push_str(&String::from_utf8(body).unwrap());
        let _ = tx.send(request);

        let mut socket = reader.into_inner();
        socket.write_all(response).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    (addr, rx)
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Poll until `f` holds or the deadline passes.
pub async fn eventually(mut f: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if f() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
