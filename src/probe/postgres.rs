//! PostgreSQL readiness probe.
//!
//! Sends an SSLRequest and expects the single-byte answer every live server
//! gives before any authentication: `S` (TLS available) or `N` (not).

use tokio::net::TcpStream;

use super::{first_chunk, ProbeParams};
use crate::status::{Status, StatusCode};

/// SSLRequest request code (1234 << 16 | 5679).
pub const SSL_REQUEST_CODE: i32 = 80_877_103;

/// Big-endian `int32` length (8) followed by big-endian `int32` request code.
pub const SSL_REQUEST: [u8; 8] = ssl_request();

const fn ssl_request() -> [u8; 8] {
    let len = 8i32.to_be_bytes();
    let code = SSL_REQUEST_CODE.to_be_bytes();
    [len[0], len[1], len[2], len[3], code[0], code[1], code[2], code[3]]
}

pub async fn probe(mut stream: TcpStream, params: ProbeParams<'_>) -> Status {
    match first_chunk(&mut stream, Some(&SSL_REQUEST), params.timeout, "PostgreSQL").await {
        Ok(response) => classify(&response),
        Err(status) => status,
    }
}

pub fn classify(response: &[u8]) -> Status {
    match response {
        [b'S'] => Status::new(StatusCode::Connected, "PostgreSQL is ready (SSL supported)"),
        [b'N'] => Status::new(StatusCode::Connected, "PostgreSQL is ready (SSL not supported)"),
        [] => Status::new(StatusCode::InvalidProtocol, "Empty response from PostgreSQL"),
        other => {
            tracing::debug!(bytes = other.len(), first = other[0], "Unexpected SSLRequest reply");
            Status::new(
                StatusCode::InvalidProtocol,
                format!("Unexpected PostgreSQL SSLRequest reply ({} bytes)", other.len()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssl_request_layout() {
        assert_eq!(SSL_REQUEST, [0x00, 0x00, 0x00, 0x08, 0x04, 0xd2, 0x16, 0x2f]);
    }

    #[test]
    fn ssl_answers_are_ready() {
        assert_eq!(classify(&[0x53]).code(), StatusCode::Connected);
        assert_eq!(classify(&[0x4e]).code(), StatusCode::Connected);
    }

    #[test]
    fn anything_else_is_invalid() {
        assert_eq!(classify(&[]).code(), StatusCode::InvalidProtocol);
        assert_eq!(classify(&[b'E']).code(), StatusCode::InvalidProtocol);
        assert_eq!(classify(b"HTTP/1.1 400").code(), StatusCode::InvalidProtocol);
    }
}
