//! Status taxonomy shared by every stage of a poll.
//!
//! # Data Flow
//! ```text
//! connector → Status (ECONNREFUSED, ENOTFOUND, ... or SOCKET_CONNECTED)
//!     → probe → Status (CONNECTED, INVALID_PROTOCOL, NO_DATA_RECEIVED, ...)
//!     → poll engine → PollStatus (public codes only)
//! ```
//!
//! # Design Decisions
//! - `Status` is an immutable value, built once per attempt
//! - The live socket never rides inside `Status`; see `net::connector::ConnectStatus`
//! - `PollStatus` can only hold a public code

pub mod code;

use std::fmt;
use std::io;
use std::sync::Arc;

pub use code::StatusCode;

/// Outcome of one stage: a code, a human-readable message and the
/// underlying I/O error when one exists.
#[derive(Debug, Clone)]
pub struct Status {
    code: StatusCode,
    message: String,
    cause: Option<Arc<io::Error>>,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(code: StatusCode, message: impl Into<String>, cause: io::Error) -> Self {
        Self {
            code,
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&io::Error> {
        self.cause.as_deref()
    }

    pub fn shared_cause(&self) -> Option<Arc<io::Error>> {
        self.cause.clone()
    }

    /// Re-code this status, keeping its cause.
    pub(crate) fn recode(&self, code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: self.cause.clone(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({})", cause)?;
        }
        Ok(())
    }
}

/// Terminal status returned by the poll engine. Always carries a public code.
#[derive(Debug, Clone)]
pub struct PollStatus(Status);

impl PollStatus {
    /// Narrow an arbitrary status to the public subset.
    ///
    /// An internal code that somehow reaches a caller is reported as
    /// `UNKNOWN`, keeping its message and cause.
    pub fn narrow(status: Status) -> Self {
        if status.code.is_public() {
            return Self(status);
        }
        Self(Status {
            code: StatusCode::Unknown,
            message: format!("{} ({})", status.message, status.code),
            cause: status.cause,
        })
    }

    pub fn code(&self) -> StatusCode {
        self.0.code
    }

    pub fn message(&self) -> &str {
        &self.0.message
    }

    pub fn cause(&self) -> Option<&io::Error> {
        self.0.cause()
    }

    pub fn shared_cause(&self) -> Option<Arc<io::Error>> {
        self.0.shared_cause()
    }

    pub fn is_connected(&self) -> bool {
        self.0.code == StatusCode::Connected
    }

    pub fn into_status(self) -> Status {
        self.0
    }
}

impl fmt::Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_keeps_public_codes() {
        let status = PollStatus::narrow(Status::new(StatusCode::InvalidProtocol, "bad frame"));
        assert_eq!(status.code(), StatusCode::InvalidProtocol);
        assert_eq!(status.message(), "bad frame");
    }

    #[test]
    fn narrow_folds_internal_codes_into_unknown() {
        let cause = io::Error::from(io::ErrorKind::ConnectionRefused);
        let status = PollStatus::narrow(Status::with_cause(StatusCode::ConnRefused, "refused", cause));
        assert_eq!(status.code(), StatusCode::Unknown);
        assert!(status.message().contains("ECONNREFUSED"));
        assert_eq!(status.cause().map(|e| e.kind()), Some(io::ErrorKind::ConnectionRefused));
    }

    #[test]
    fn display_includes_code_and_cause() {
        let cause = io::Error::new(io::ErrorKind::Other, "boom");
        let status = Status::with_cause(StatusCode::UnknownPingError, "probe failed", cause);
        assert_eq!(status.to_string(), "UNKNOWN_PING_ERROR: probe failed (boom)");
    }
}
