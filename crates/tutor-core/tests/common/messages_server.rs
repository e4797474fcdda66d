//! Minimal HTTP/1.1 server that answers `POST /v1/messages` for integration tests.
//!
//! Replies come from a fixed script, one per request; the last reply repeats
//! once the script runs out. Each request is read in full (headers and
//! `Content-Length` body) before replying.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One scripted reply: status line code and JSON body.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    /// Never answer; hold the connection until the client drops it.
    pub stall: bool,
}

impl Reply {
    /// 200 with a Messages API envelope whose text block is `text`.
    pub fn text(text: &str) -> Self {
        let body = serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": text }],
        });
        Self {
            status: 200,
            body: body.to_string(),
            stall: false,
        }
    }

    /// Error envelope with the service's error type.
    pub fn error(status: u16, kind: &str, message: &str) -> Self {
        let body = serde_json::json!({
            "type": "error",
            "error": { "type": kind, "message": message },
        });
        Self {
            status,
            body: body.to_string(),
            stall: false,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            stall: false,
        }
    }

    pub fn stall() -> Self {
        Self {
            status: 200,
            body: String::new(),
            stall: true,
        }
    }
}

/// Handle to a running server.
pub struct MessagesServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<String>>>,
    client_gone: Arc<AtomicBool>,
}

impl MessagesServer {
    /// True once a client closed a stalled connection.
    pub fn client_gone(&self) -> bool {
        self.client_gone.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw text (headers and body) of the most recent request.
    pub fn last_request(&self) -> Option<String> {
        self.last_request.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(script: Vec<Reply>) -> MessagesServer {
    assert!(!script.is_empty(), "script needs at least one reply");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let last_request = Arc::new(Mutex::new(None));
    let client_gone = Arc::new(AtomicBool::new(false));
    let script = Arc::new(script);
    {
        let hits = Arc::clone(&hits);
        let last_request = Arc::clone(&last_request);
        let client_gone = Arc::clone(&client_gone);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                let reply = script[n.min(script.len() - 1)].clone();
                let last_request = Arc::clone(&last_request);
                let client_gone = Arc::clone(&client_gone);
                thread::spawn(move || handle(stream, &reply, &last_request, &client_gone));
            }
        });
    }
    MessagesServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        hits,
        last_request,
        client_gone,
    }
}

/// A base URL on which nothing is listening (connection refused).
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn handle(
    mut stream: TcpStream,
    reply: &Reply,
    last_request: &Mutex<Option<String>>,
    client_gone: &AtomicBool,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    *last_request.lock().unwrap() = Some(request);
    if reply.stall {
        wait_for_close(&mut stream, client_gone);
        return;
    }
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason(reply.status),
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Holds the connection until the peer closes it (flagging that) or 30s pass.
fn wait_for_close(stream: &mut TcpStream, client_gone: &AtomicBool) {
    let _ = stream.set_read_timeout(Some(Duration::from_millis(100)));
    let mut buf = [0u8; 1024];
    for _ in 0..300 {
        match stream.read(&mut buf) {
            Ok(0) => {
                client_gone.store(true, Ordering::SeqCst);
                return;
            }
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(_) => {
                client_gone.store(true, Ordering::SeqCst);
                return;
            }
        }
    }
}

/// Reads headers, then exactly `Content-Length` body bytes.
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        if let Some(pos) = find(&data, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
    };
    let headers = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = headers
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    Some(String::from_utf8_lossy(&data).to_string())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        529 => "Overloaded",
        _ => "Status",
    }
}
