//! Shared test utilities: a one-shot HTTP endpoint that records what it receives

#![allow(dead_code)]

use removebg::RemoveBgClient;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const TEST_API_KEY: &str = "test-api-key";

/// Canned response served by [`MockEndpoint`]
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl MockResponse {
    /// 200 with an image body
    pub fn image(body: &[u8]) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: "image/png",
            headers: Vec::new(),
            body: body.to_vec(),
        }
    }

    /// Error status with a JSON body
    pub fn json_error(status: u16, reason: &'static str, body: &str) -> Self {
        Self {
            status,
            reason,
            content_type: "application/json",
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

/// One multipart part as it arrived on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content: Vec<u8>,
}

impl ReceivedPart {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Raw request captured by [`MockEndpoint`]
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// Header lookup, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the multipart body into its parts
    pub fn parts(&self) -> Vec<ReceivedPart> {
        let content_type = self.header("content-type").expect("missing content type");
        assert!(
            content_type.starts_with("multipart/form-data"),
            "unexpected content type {content_type}"
        );
        let boundary = content_type
            .split("boundary=")
            .nth(1)
            .expect("missing boundary")
            .trim_matches('"');
        parse_multipart(&self.body, boundary)
    }

    pub fn part(&self, name: &str) -> Option<ReceivedPart> {
        self.parts().into_iter().find(|part| part.name == name)
    }

    pub fn field(&self, name: &str) -> Option<String> {
        self.part(name).map(|part| part.text())
    }

    pub fn field_names(&self) -> Vec<String> {
        self.parts().into_iter().map(|part| part.name).collect()
    }
}

/// Local HTTP endpoint serving exactly one request
pub struct MockEndpoint {
    url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl MockEndpoint {
    pub async fn start(response: MockResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            write_response(&mut stream, &response).await;
            request
        });

        Self {
            url: format!("http://{}/v1.0/removebg", addr),
            handle,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Client pointed at this endpoint, bypassing any proxy settings
    pub fn client(&self) -> RemoveBgClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        RemoveBgClient::builder(TEST_API_KEY)
            .endpoint(self.url.clone())
            .http_client(http)
            .build()
            .unwrap()
    }

    /// The request the endpoint served
    pub async fn received(self) -> CapturedRequest {
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("no request received")
            .unwrap()
    }

    /// Assert that nobody connected within a short grace period
    pub async fn assert_untouched(self) {
        let waited = tokio::time::timeout(Duration::from_millis(200), self.handle).await;
        assert!(waited.is_err(), "endpoint unexpectedly received a request");
    }
}

/// An endpoint URL where nothing is listening
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1.0/removebg", addr)
}

async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or_default().to_string();
    let path = request_parts.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let header_value = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    };

    let mut body = buffer[header_end + 4..].to_vec();
    if let Some(length) = header_value("content-length") {
        let length: usize = length.parse().unwrap();
        while body.len() < length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            body.extend_from_slice(&chunk[..n]);
        }
    } else if header_value("transfer-encoding").is_some_and(|v| v.contains("chunked")) {
        while !body.ends_with(b"0\r\n\r\n") {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            body.extend_from_slice(&chunk[..n]);
        }
        body = decode_chunked(&body);
    }

    CapturedRequest {
        method,
        path,
        headers,
        body,
    }
}

async fn write_response(stream: &mut TcpStream, response: &MockResponse) {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.reason,
        response.content_type,
        response.body.len()
    );
    for (name, value) in &response.headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(&response.body).await.unwrap();
    stream.flush().await.unwrap();
    let _ = stream.shutdown().await;
}

fn decode_chunked(mut raw: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::new();
    loop {
        let line_end = find(raw, b"\r\n").expect("bad chunk header");
        let size_text = String::from_utf8_lossy(&raw[..line_end]);
        let size = usize::from_str_radix(size_text.split(';').next().unwrap().trim(), 16).unwrap();
        raw = &raw[line_end + 2..];
        if size == 0 {
            return decoded;
        }
        decoded.extend_from_slice(&raw[..size]);
        raw = &raw[size + 2..];
    }
}

fn parse_multipart(body: &[u8], boundary: &str) -> Vec<ReceivedPart> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut parts = Vec::new();

    let first = find(body, &delimiter).expect("no multipart delimiter");
    let mut rest = &body[first + delimiter.len()..];
    while !rest.starts_with(b"--") {
        rest = rest.strip_prefix(b"\r\n").unwrap_or(rest);
        let next = find(rest, &delimiter).expect("unterminated multipart part");
        let raw_part = &rest[..next];
        let raw_part = raw_part.strip_suffix(b"\r\n").unwrap_or(raw_part);

        let header_end = find(raw_part, b"\r\n\r\n").expect("part without headers");
        let part_headers = String::from_utf8_lossy(&raw_part[..header_end]).into_owned();
        parts.push(ReceivedPart {
            name: disposition_param(&part_headers, "name").expect("part without name"),
            file_name: disposition_param(&part_headers, "filename"),
            content: raw_part[header_end + 4..].to_vec(),
        });

        rest = &rest[next + delimiter.len()..];
    }

    parts
}

fn disposition_param(headers: &str, key: &str) -> Option<String> {
    let marker = format!("; {}=\"", key);
    let start = headers.find(&marker)? + marker.len();
    let end = headers[start..].find('"')? + start;
    Some(headers[start..end].to_string())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
