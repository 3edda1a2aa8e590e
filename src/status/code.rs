//! Closed set of outcome codes.

use std::fmt;

/// Outcome code of a connect, probe or poll.
///
/// The first group is visible to callers of the poll engine. The second group
/// only ever flows between the connector, the probes and the retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    // --- Public ---
    /// Transport reachable and (if requested) protocol confirmed.
    Connected,
    /// Overall poll deadline, or a connect timer, expired.
    Timeout,
    /// Both address families failed name resolution.
    HostNotFound,
    /// Unclassified failure.
    Unknown,
    /// No probe exists for the requested protocol.
    ProtocolNotSupported,
    /// Probe ran but the response did not parse as the expected protocol.
    InvalidProtocol,

    // --- Internal ---
    /// TCP established, not probed yet.
    SocketConnected,
    /// Current family unreachable, flip to the other one.
    ShouldUseIpV4,
    ConnRefused,
    AccessDenied,
    ConnReset,
    /// Family-scoped resolution or address failure.
    NotFound,
    /// Probe timed out waiting for the first byte.
    NoDataReceived,
    /// Socket error while probing.
    UnknownPingError,
}

impl StatusCode {
    /// Codes that may be handed to a caller of the poll engine.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            StatusCode::Connected
                | StatusCode::Timeout
                | StatusCode::HostNotFound
                | StatusCode::Unknown
                | StatusCode::ProtocolNotSupported
                | StatusCode::InvalidProtocol
        )
    }

    /// Whether the poll engine should try again after this outcome.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            StatusCode::ConnRefused
                | StatusCode::AccessDenied
                | StatusCode::ConnReset
                | StatusCode::NotFound
                | StatusCode::ShouldUseIpV4
                | StatusCode::NoDataReceived
                | StatusCode::UnknownPingError
        )
    }

    /// Stable upper-case name, as printed in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Connected => "CONNECTED",
            StatusCode::Timeout => "TIMEOUT",
            StatusCode::HostNotFound => "HOST_NOT_FOUND",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::ProtocolNotSupported => "PROTOCOL_NOT_SUPPORTED",
            StatusCode::InvalidProtocol => "INVALID_PROTOCOL",
            StatusCode::SocketConnected => "SOCKET_CONNECTED",
            StatusCode::ShouldUseIpV4 => "SHOULD_USE_IP_V4",
            StatusCode::ConnRefused => "ECONNREFUSED",
            StatusCode::AccessDenied => "EACCES",
            StatusCode::ConnReset => "ECONNRESET",
            StatusCode::NotFound => "ENOTFOUND",
            StatusCode::NoDataReceived => "NO_DATA_RECEIVED",
            StatusCode::UnknownPingError => "UNKNOWN_PING_ERROR",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [StatusCode; 14] = [
        StatusCode::Connected,
        StatusCode::Timeout,
        StatusCode::HostNotFound,
        StatusCode::Unknown,
        StatusCode::ProtocolNotSupported,
        StatusCode::InvalidProtocol,
        StatusCode::SocketConnected,
        StatusCode::ShouldUseIpV4,
        StatusCode::ConnRefused,
        StatusCode::AccessDenied,
        StatusCode::ConnReset,
        StatusCode::NotFound,
        StatusCode::NoDataReceived,
        StatusCode::UnknownPingError,
    ];

    #[test]
    fn public_codes_are_never_retryable() {
        for code in ALL {
            if code.is_public() {
                assert!(!code.is_retryable(), "{code} is public and retryable");
            }
        }
    }

    #[test]
    fn terminal_failures_are_not_retryable() {
        assert!(!StatusCode::Unknown.is_retryable());
        assert!(!StatusCode::InvalidProtocol.is_retryable());
        assert!(!StatusCode::ProtocolNotSupported.is_retryable());
        assert!(StatusCode::NoDataReceived.is_retryable());
        assert!(StatusCode::UnknownPingError.is_retryable());
    }

    #[test]
    fn socket_connected_is_internal() {
        assert!(!StatusCode::SocketConnected.is_public());
        assert!(!StatusCode::SocketConnected.is_retryable());
    }
}
