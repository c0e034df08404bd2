//! Minimal HTTP/1.1 server for integration tests whose paths can fail a set
//! number of times before answering 200.
//!
//! Each route answers `fail_status` for its first `failures` GETs, then 200
//! with its body. Unknown paths get 404. The `User-Agent` of every request is
//! recorded per path.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub body: Vec<u8>,
    pub failures: usize,
    pub fail_status: u16,
}

impl Route {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            failures: 0,
            fail_status: 503,
        }
    }

    pub fn flaky(body: &[u8], failures: usize) -> Self {
        Self {
            failures,
            ..Self::ok(body)
        }
    }
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Route>,
    served: HashMap<String, usize>,
    agents: HashMap<String, Vec<String>>,
}

/// Handle to a running server.
#[derive(Clone)]
pub struct FlakyServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl FlakyServer {
    /// URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// User agents seen on `path`, in arrival order.
    pub fn agents(&self, path: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .agents
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    /// GETs received on `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .served
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(routes: impl IntoIterator<Item = (&'static str, Route)>) -> FlakyServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State {
        routes: routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
        ..State::default()
    }));
    let server_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&server_state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    FlakyServer {
        base: format!("http://127.0.0.1:{}", port),
        state,
    }
}

fn handle(mut stream: std::net::TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf).into_owned();
    let (method, path, agent) = parse_request(&request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let (status, body) = {
        let mut st = state.lock().unwrap();
        let seen = st.served.entry(path.clone()).or_insert(0);
        let attempt = *seen;
        *seen += 1;
        st.agents.entry(path.clone()).or_default().push(agent);
        match st.routes.get(&path) {
            Some(route) if attempt < route.failures => (route.fail_status, Vec::new()),
            Some(route) => (200, route.body.clone()),
            None => (404, Vec::new()),
        }
    };

    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn parse_request(request: &str) -> (String, String, String) {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_string();
    let path = first.next().unwrap_or("/").to_string();
    let agent = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("user-agent"))
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default();
    (method, path, agent)
}
