//! Library entry point.
//!
//! Wraps the poll engine in a `Result`, for callers that only need to know
//! whether the dependency came up and why not.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::poll::{self, PollParams};
use crate::status::{PollStatus, StatusCode};

/// Why a dependency never became ready.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("{message}")]
    Timeout {
        message: String,
        #[source]
        source: Option<Arc<io::Error>>,
    },

    #[error("{message}")]
    HostNotFound {
        message: String,
        #[source]
        source: Option<Arc<io::Error>>,
    },

    #[error("{message}")]
    InvalidProtocol { message: String },

    #[error("{message}")]
    Unknown {
        message: String,
        #[source]
        source: Option<Arc<io::Error>>,
    },
}

impl ProbeError {
    /// Map a failed terminal status. Returns `None` for `CONNECTED`.
    pub fn from_status(status: &PollStatus) -> Option<Self> {
        let message = status.message().to_string();
        let source = status.shared_cause();
        let error = match status.code() {
            StatusCode::Connected => return None,
            StatusCode::Timeout => ProbeError::Timeout { message, source },
            StatusCode::HostNotFound => ProbeError::HostNotFound { message, source },
            StatusCode::InvalidProtocol => ProbeError::InvalidProtocol { message },
            _ => ProbeError::Unknown { message, source },
        };
        Some(error)
    }
}

/// Block until `params.host:params.port` is ready.
pub async fn await_ready(params: &PollParams) -> Result<(), ProbeError> {
    let status = poll::poll(params).await;
    match ProbeError::from_status(&status) {
        None => Ok(()),
        Some(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use std::error::Error as _;

    #[test]
    fn maps_terminal_statuses() {
        let ok = PollStatus::narrow(Status::new(StatusCode::Connected, "ok"));
        assert!(ProbeError::from_status(&ok).is_none());

        let timeout = PollStatus::narrow(Status::new(StatusCode::Timeout, "too slow"));
        assert!(matches!(
            ProbeError::from_status(&timeout),
            Some(ProbeError::Timeout { .. })
        ));

        let unsupported = PollStatus::narrow(Status::new(StatusCode::ProtocolNotSupported, "nope"));
        assert!(matches!(
            ProbeError::from_status(&unsupported),
            Some(ProbeError::Unknown { .. })
        ));
    }

    #[test]
    fn keeps_underlying_cause() {
        let cause = io::Error::from(io::ErrorKind::AddrNotAvailable);
        let status = PollStatus::narrow(Status::with_cause(StatusCode::HostNotFound, "Host not found: db", cause));
        let error = ProbeError::from_status(&status).unwrap();
        assert_eq!(error.to_string(), "Host not found: db");
        assert!(error.source().is_some());
    }
}
