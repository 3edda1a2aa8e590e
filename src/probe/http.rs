//! HTTP readiness probe.
//!
//! Sends a bare `GET` and accepts any well-formed status line. The goal is an
//! endpoint that speaks HTTP, not a particular status code.

use std::net::SocketAddr;

use tokio::net::TcpStream;

use super::{first_chunk, ProbeParams};
use crate::status::{Status, StatusCode};

const DEFAULT_PATH: &str = "/";

/// Build the request line and `Host` header for `path`.
pub fn request(path: Option<&str>, peer: Option<SocketAddr>) -> String {
    let host = match peer {
        Some(SocketAddr::V4(addr)) => addr.ip().to_string(),
        Some(SocketAddr::V6(addr)) => format!("[{}]", addr.ip()),
        None => "localhost".to_string(),
    };
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\n\r\n",
        path.unwrap_or(DEFAULT_PATH),
        host
    )
}

pub async fn probe(mut stream: TcpStream, params: ProbeParams<'_>) -> Status {
    let request = request(params.path, stream.peer_addr().ok());
    match first_chunk(&mut stream, Some(request.as_bytes()), params.timeout, "HTTP").await {
        Ok(response) => classify(&response),
        Err(status) => status,
    }
}

/// Classify the first chunk of an HTTP response.
pub fn classify(response: &[u8]) -> Status {
    if response.is_empty() {
        return Status::new(StatusCode::InvalidProtocol, "Empty response from server");
    }

    let text = String::from_utf8_lossy(response);
    let status_line = text.split("\r\n").next().unwrap_or_default();
    let parts: Vec<&str> = status_line.split(' ').collect();

    if parts.len() < 2 {
        tracing::debug!(status_line, "Invalid HTTP status line");
        return Status::new(
            StatusCode::InvalidProtocol,
            format!("Invalid HTTP status line: {}", status_line),
        );
    }
    if !parts[0].starts_with("HTTP/") {
        tracing::debug!(status_line, "Not an HTTP response");
        return Status::new(
            StatusCode::InvalidProtocol,
            format!("Not an HTTP response: {}", status_line),
        );
    }

    tracing::debug!(status_line, "HTTP status line");
    Status::new(StatusCode::Connected, format!("HTTP {}", parts[1]))
}
