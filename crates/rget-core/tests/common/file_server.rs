//! Minimal HTTP/1.1 file server for integration tests.
//!
//! Serves a single static body with a fixed `Last-Modified`, answers HEAD and
//! GET, and records the headers of every request it receives so tests can
//! assert on what the client actually sent. Accepted connections are counted
//! so tests can check that the client reuses them.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Modification time served for every file: 2017-12-02T12:00:00Z.
pub const MTIME_SECS: u64 = 1_512_216_000;

pub fn mtime() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(MTIME_SECS)
}

#[derive(Debug, Clone, Copy)]
pub struct FileServerOptions {
    /// Status returned for every request.
    pub status: u16,
    /// If set, only this many body bytes are sent (Content-Length still
    /// advertises the full size) before the connection is closed.
    pub truncate_at: Option<usize>,
    /// If set, every path except `/woo.txt` answers 302 with this `Location`.
    pub redirect_location: Option<&'static str>,
    /// Serve several requests per connection instead of closing after one.
    pub keep_alive: bool,
}

impl Default for FileServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            truncate_at: None,
            redirect_location: None,
            keep_alive: false,
        }
    }
}

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// All values of header `name`, in the order received.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

pub struct FileServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    connections: Arc<AtomicUsize>,
}

impl FileServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of TCP connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body` on every path.
/// The server runs until the process exits.
pub fn start(body: &[u8]) -> FileServer {
    start_with_options(body, FileServerOptions::default())
}

pub fn start_with_options(body: &[u8], opts: FileServerOptions) -> FileServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body.to_vec());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let connections = Arc::new(AtomicUsize::new(0));
    let accepted = Arc::clone(&connections);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            accepted.fetch_add(1, Ordering::SeqCst);
            let body = Arc::clone(&body);
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || handle(stream, &body, opts, &recorded));
        }
    });
    FileServer {
        url: format!("http://127.0.0.1:{}/woo.txt", port),
        requests,
        connections,
    }
}

/// A URL on localhost where nothing is listening.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/woo.txt", port)
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: FileServerOptions,
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    while let Some(head) = read_head(&mut stream) {
        let request = match parse_request(&head) {
            Some(r) => r,
            None => return,
        };
        let keep_open = respond(&mut stream, request, body, opts, recorded);
        if !keep_open {
            return;
        }
    }
}

/// Writes one response. Returns whether the connection stays open.
fn respond(
    stream: &mut TcpStream,
    request: RecordedRequest,
    body: &[u8],
    opts: FileServerOptions,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> bool {
    let method = request.method.clone();
    let path = request.path.clone();
    recorded.lock().unwrap().push(request);

    let keep_alive = opts.keep_alive && opts.truncate_at.is_none();
    let connection = if keep_alive { "" } else { "Connection: close\r\n" };

    if let Some(location) = opts.redirect_location.filter(|_| path != "/woo.txt") {
        let response = format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\n{}\r\n",
            location, connection,
        );
        let _ = stream.write_all(response.as_bytes());
        return keep_alive;
    }

    let is_head = method.eq_ignore_ascii_case("HEAD");
    if !is_head && !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(
            b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return false;
    }

    let (status_text, payload): (&str, &[u8]) = match opts.status {
        200 => ("OK", body),
        401 => ("Unauthorized", b"unauthorized"),
        404 => ("Not Found", b"not found"),
        500 => ("Internal Server Error", b"boom"),
        _ => ("Status", b""),
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nLast-Modified: {}\r\nAccept-Ranges: bytes\r\nContent-Type: text/plain\r\n{}\r\n",
        opts.status,
        status_text,
        payload.len(),
        httpdate::fmt_http_date(mtime()),
        connection,
    );
    let _ = stream.write_all(response.as_bytes());
    if is_head {
        return keep_alive;
    }
    let sent = match opts.truncate_at {
        Some(n) => &payload[..n.min(payload.len())],
        None => payload,
    };
    let _ = stream.write_all(sent);
    let _ = stream.flush();
    keep_alive
}

/// Reads until the end of the request head (blank line).
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn parse_request(request: &str) -> Option<RecordedRequest> {
    let mut lines = request.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    Some(RecordedRequest {
        method,
        path,
        headers,
    })
}
