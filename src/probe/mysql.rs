//! MySQL readiness probe.
//!
//! The server speaks first with its initial handshake packet:
//!
//! ```text
//! [3 bytes] payload length
//! [1 byte]  sequence id (0)
//! [1 byte]  protocol version (10), or 0xff for an error packet
//! [...]     server version, capabilities, ...
//! ```
//!
//! Only the header and the version byte are checked. An error packet (for
//! example "too many connections") still proves a live MySQL server.

use tokio::net::TcpStream;

use super::{first_chunk, ProbeParams};
use crate::status::{Status, StatusCode};

/// 4-byte header plus the protocol version byte.
const MIN_PACKET_SIZE: usize = 5;
const SEQUENCE_ID_OFFSET: usize = 3;
const PROTOCOL_VERSION_OFFSET: usize = 4;
const HANDSHAKE_V10: u8 = 10;
const ERR_PACKET_MARKER: u8 = 0xff;

pub async fn probe(mut stream: TcpStream, params: ProbeParams<'_>) -> Status {
    match first_chunk(&mut stream, None, params.timeout, "MySQL").await {
        Ok(packet) => classify(&packet),
        Err(status) => status,
    }
}

pub fn classify(packet: &[u8]) -> Status {
    if packet.len() < MIN_PACKET_SIZE {
        tracing::debug!(bytes = packet.len(), "Packet too short");
        return Status::new(StatusCode::InvalidProtocol, "Packet too short for MySQL handshake");
    }

    let sequence_id = packet[SEQUENCE_ID_OFFSET];
    let protocol_version = packet[PROTOCOL_VERSION_OFFSET];

    match (sequence_id, protocol_version) {
        (0, HANDSHAKE_V10) => Status::new(StatusCode::Connected, "MySQL is ready"),
        (0, ERR_PACKET_MARKER) => {
            tracing::debug!("MySQL error packet, server is alive");
            Status::new(StatusCode::Connected, "MySQL is ready (error packet)")
        }
        (0, version) => Status::new(
            StatusCode::InvalidProtocol,
            format!("Unsupported MySQL protocol version: {}", version),
        ),
        (id, _) => Status::new(
            StatusCode::InvalidProtocol,
            format!("Unexpected sequence id: {}", id),
        ),
    }
}
