//! Protocol probes.
//!
//! # Data Flow
//! ```text
//! connected TcpStream (unread)
//!     → protocol module writes its request (MySQL writes nothing)
//!     → first_chunk() waits for the first bytes, bounded by the probe timer
//!     → classify() parses just enough to confirm the protocol
//!     → stream dropped (closed) on return
//! ```
//!
//! # Design Decisions
//! - Probes take the stream by value, so no socket outlives one attempt
//! - Only the first chunk of the response is inspected
//! - No data before the timer fires, or a close before the first byte, is
//!   `NO_DATA_RECEIVED` (retryable)
//! - A socket error mid-probe is `UNKNOWN_PING_ERROR` (retryable)
//! - A well-formed error reply from the server still counts as ready

pub mod http;
pub mod mysql;
pub mod postgres;
pub mod redis;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

use crate::status::{Status, StatusCode};

/// Default bound on time-to-first-byte.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

const READ_BUFFER_SIZE: usize = 1024;

/// Application protocol checked after the TCP connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Transport reachable is sufficient.
    #[default]
    None,
    Http,
    /// Probed with the plain HTTP request; no TLS is negotiated.
    Https,
    #[serde(alias = "pg")]
    Postgresql,
    Mysql,
    Redis,
}

impl Protocol {
    pub const ALL: [Protocol; 6] = [
        Protocol::None,
        Protocol::Http,
        Protocol::Https,
        Protocol::Postgresql,
        Protocol::Mysql,
        Protocol::Redis,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::None => "none",
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Postgresql => "postgresql",
            Protocol::Mysql => "mysql",
            Protocol::Redis => "redis",
        }
    }

    /// Well-known port used when a target names a scheme but no port.
    pub fn default_port(self) -> Option<u16> {
        match self {
            Protocol::None => None,
            Protocol::Http => Some(80),
            Protocol::Https => Some(443),
            Protocol::Postgresql => Some(5432),
            Protocol::Mysql => Some(3306),
            Protocol::Redis => Some(6379),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a supported protocol (expected none, http, https, pg, postgresql, mysql or redis)")]
pub struct UnknownProtocol(pub String);

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower == "pg" {
            return Ok(Protocol::Postgresql);
        }
        Protocol::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| UnknownProtocol(s.to_string()))
    }
}

/// Per-probe settings.
#[derive(Debug, Clone, Copy)]
pub struct ProbeParams<'a> {
    /// Bound on time-to-first-byte. `Duration::ZERO` waits indefinitely.
    pub timeout: Duration,
    /// Request path, HTTP only.
    pub path: Option<&'a str>,
}

impl Default for ProbeParams<'_> {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
            path: None,
        }
    }
}

/// Run the probe for `protocol` over an already-connected stream.
///
/// The stream is closed before this returns, on every path.
pub async fn probe(protocol: Protocol, stream: TcpStream, params: ProbeParams<'_>) -> Status {
    match protocol {
        Protocol::None => {
            drop(stream);
            Status::new(StatusCode::Connected, "Connected")
        }
        Protocol::Http | Protocol::Https => http::probe(stream, params).await,
        Protocol::Postgresql => postgres::probe(stream, params).await,
        Protocol::Mysql => mysql::probe(stream, params).await,
        Protocol::Redis => redis::probe(stream, params).await,
    }
}

/// Write `request` (if any) and wait for the first chunk of the reply.
///
/// The returned chunk is never empty. An orderly close before any byte
/// arrives is reported like a silent server, since a port proxy in front of
/// a starting service accepts and drops connections.
pub(crate) async fn first_chunk(
    stream: &mut TcpStream,
    request: Option<&[u8]>,
    timeout: Duration,
    server: &str,
) -> Result<Vec<u8>, Status> {
    let exchange = async {
        if let Some(request) = request {
            stream.write_all(request).await?;
        }
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let n = stream.read(&mut buf).await?;
        buf.truncate(n);
        Ok::<_, std::io::Error>(buf)
    };

    let outcome = if timeout.is_zero() {
        exchange.await
    } else {
        match time::timeout(timeout, exchange).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let ms = timeout.as_millis();
                tracing::debug!(server, timeout_ms = ms as u64, "No data received");
                return Err(Status::new(
                    StatusCode::NoDataReceived,
                    format!("No data received in {}ms", ms),
                ));
            }
        }
    };

    match outcome {
        Ok(data) if data.is_empty() => {
            tracing::debug!(server, "Connection closed before any data");
            Err(Status::new(
                StatusCode::NoDataReceived,
                format!("Connection closed by {} server before any data was received", server),
            ))
        }
        Ok(data) => {
            tracing::trace!(server, bytes = data.len(), "Data received");
            Ok(data)
        }
        Err(e) => {
            tracing::debug!(server, error = %e, "Socket error while probing");
            Err(Status::with_cause(
                StatusCode::UnknownPingError,
                format!("Socket error while pinging {} server", server),
                e,
            ))
        }
    }
}
