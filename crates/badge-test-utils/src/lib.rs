//! Shared fixtures for badge crate tests: a scripted HTTP mock server and
//! in-memory image generators.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

pub mod images;

#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Canned response served by the mock server
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status_line: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn json(status_line: &str, body: &str) -> Self {
        Self {
            status_line: status_line.to_string(),
            content_type: "application/json".to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(status_line: &str, body: Vec<u8>) -> Self {
        Self {
            status_line: status_line.to_string(),
            content_type: "application/octet-stream".to_string(),
            body,
        }
    }
}

/// Spawn a one-shot HTTP mock server that accepts a single request, captures it,
/// and responds with the given status line and JSON body. Returns the base URL and a
/// receiver that yields the captured request.
pub fn spawn_one_shot_server(
    status_line: &str,
    response_body: &str,
) -> (String, mpsc::Receiver<CapturedRequest>) {
    spawn_scripted_server(vec![MockResponse::json(status_line, response_body)])
}

/// Spawn a mock server that answers one connection per scripted response, in
/// order, then stops accepting.
pub fn spawn_scripted_server(
    responses: Vec<MockResponse>,
) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let addr = listener.local_addr().expect("read mock server addr");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for response in responses {
            let (mut stream, _) = listener.accept().expect("accept mock request");
            let req = read_http_request(&mut stream);
            // The test may have stopped listening; the response still goes out.
            let _ = tx.send(req);

            let head = format!(
                "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                response.status_line,
                response.content_type,
                response.body.len(),
            );
            stream
                .write_all(head.as_bytes())
                .expect("write mock response head");
            stream
                .write_all(&response.body)
                .expect("write mock response body");
        }
    });

    (format!("http://{addr}"), rx)
}

fn read_http_request(stream: &mut std::net::TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut header_end = None;
    let mut content_length = 0usize;

    loop {
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).expect("read request bytes");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if header_end.is_none() {
            header_end = buf
                .windows(4)
                .position(|window| window == b"\r\n\r\n")
                .map(|idx| idx + 4);
            if let Some(end) = header_end {
                let headers = String::from_utf8_lossy(&buf[..end]);
                for line in headers.lines() {
                    if let Some((key, value)) = line.split_once(':')
                        && key.eq_ignore_ascii_case("content-length")
                    {
                        content_length = value.trim().parse::<usize>().unwrap_or(0);
                    }
                }
            }
        }
        if let Some(end) = header_end
            && buf.len() >= end + content_length
        {
            break;
        }
    }

    let end = header_end.expect("request headers must be present");
    let headers_raw = String::from_utf8_lossy(&buf[..end]);
    let mut lines = headers_raw.lines();
    let request_line = lines.next().expect("request line");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().expect("method").to_string();
    let path = parts.next().expect("path").to_string();
    let mut headers = HashMap::new();
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    let body = buf[end..end + content_length].to_vec();

    CapturedRequest {
        method,
        path,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpStream;

    #[test]
    fn mock_server_captures_put_body() {
        let (url, rx) = spawn_one_shot_server("200 OK", r#"{"ok":true}"#);
        let addr = url.trim_start_matches("http://");
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .write_all(
                b"PUT /upload HTTP/1.1\r\nHost: localhost\r\nX-Name: a.jpg\r\nContent-Length: 3\r\nConnection: close\r\n\r\nabc",
            )
            .unwrap();
        let mut resp = String::new();
        stream.read_to_string(&mut resp).unwrap();
        assert!(resp.contains("200 OK"));
        assert!(resp.ends_with(r#"{"ok":true}"#));

        let req = rx.recv().unwrap();
        assert_eq!(req.method, "PUT");
        assert_eq!(req.path, "/upload");
        assert_eq!(req.header("X-Name"), Some("a.jpg"));
        assert_eq!(req.body, b"abc");
    }

    #[test]
    fn scripted_server_answers_in_order() {
        let (url, rx) = spawn_scripted_server(vec![
            MockResponse::json("201 Created", "{}"),
            MockResponse::bytes("404 Not Found", Vec::new()),
        ]);
        let addr = url.trim_start_matches("http://");

        for (path, expected) in [("/first", "201 Created"), ("/second", "404 Not Found")] {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream
                .write_all(
                    format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                        .as_bytes(),
                )
                .unwrap();
            let mut resp = String::new();
            stream.read_to_string(&mut resp).unwrap();
            assert!(resp.contains(expected));
            assert_eq!(rx.recv().unwrap().path, path);
        }
    }
}
