//! Redis readiness probe.
//!
//! Sends the inline `PING`. `+PONG` means ready; any RESP error line
//! (`-NOAUTH`, `-LOADING`, ...) still means a live Redis server.

use tokio::net::TcpStream;

use super::{first_chunk, ProbeParams};
use crate::status::{Status, StatusCode};

const PING_COMMAND: &[u8] = b"PING\r\n";
const SIMPLE_STRING_PREFIX: char = '+';
const ERROR_PREFIX: char = '-';

pub async fn probe(mut stream: TcpStream, params: ProbeParams<'_>) -> Status {
    match first_chunk(&mut stream, Some(PING_COMMAND), params.timeout, "Redis").await {
        Ok(response) => classify(&response),
        Err(status) => status,
    }
}

pub fn classify(response: &[u8]) -> Status {
    let text = String::from_utf8_lossy(response);
    let reply = text.trim();

    if reply.is_empty() {
        return Status::new(StatusCode::InvalidProtocol, "Empty response from Redis");
    }
    if reply.starts_with(SIMPLE_STRING_PREFIX) {
        return Status::new(StatusCode::Connected, "Redis is ready");
    }
    if reply.starts_with(ERROR_PREFIX) {
        tracing::debug!(reply, "Redis error reply, server is alive");
        return Status::new(StatusCode::Connected, format!("Redis is ready ({})", reply));
    }

    tracing::debug!(reply, "Invalid RESP reply");
    Status::new(
        StatusCode::InvalidProtocol,
        format!("Invalid Redis response: {}", reply),
    )
}
