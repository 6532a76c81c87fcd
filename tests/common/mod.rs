#![allow(dead_code)]

use std::io::ErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use sicap_mcp::app::App;
use sicap_mcp::services::sicap::SicapClient;

enum Behavior {
    Respond {
        status: String,
        content_type: String,
        body: String,
    },
    Hang,
}

/// Canned HTTP upstream bound to an ephemeral local port. Serves the
/// same response to every connection and records what it was asked.
pub struct MockUpstream {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    request_lines: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub async fn serve(status: &str, content_type: &str, body: &str) -> Option<MockUpstream> {
        Self::start(Behavior::Respond {
            status: status.to_string(),
            content_type: content_type.to_string(),
            body: body.to_string(),
        })
        .await
    }

    pub async fn serve_json(body: &str) -> Option<MockUpstream> {
        Self::serve("200 OK", "application/json", body).await
    }

    /// Accepts connections but never answers them.
    pub async fn serve_silence() -> Option<MockUpstream> {
        Self::start(Behavior::Hang).await
    }

    async fn start(behavior: Behavior) -> Option<MockUpstream> {
        let listener = match TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(err) if err.kind() == ErrorKind::PermissionDenied => return None,
            Err(err) => panic!("failed to bind local test listener: {err}"),
        };
        let addr = listener.local_addr().expect("listener address");
        let hits = Arc::new(AtomicUsize::new(0));
        let request_lines = Arc::new(Mutex::new(Vec::new()));

        let task_hits = hits.clone();
        let task_lines = request_lines.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                task_hits.fetch_add(1, Ordering::SeqCst);
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]).to_string();
                if let Some(line) = head.lines().next() {
                    task_lines.lock().await.push(line.to_string());
                }
                match &behavior {
                    Behavior::Respond {
                        status,
                        content_type,
                        body,
                    } => {
                        let response = format!(
                            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: {content_type}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    Behavior::Hang => {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    }
                }
            }
        });

        Some(MockUpstream {
            base_url: format!("http://{addr}"),
            hits,
            request_lines,
        })
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub async fn request_lines(&self) -> Vec<String> {
        self.request_lines.lock().await.clone()
    }
}

/// Base URL of a port that was just closed, so connections are refused.
pub async fn refused_base_url() -> Option<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
    let addr = listener.local_addr().ok()?;
    drop(listener);
    Some(format!("http://{addr}"))
}

pub fn test_app(base_url: &str) -> App {
    let client = SicapClient::new(base_url).expect("test client");
    App::with_client(client).expect("tool wiring")
}
