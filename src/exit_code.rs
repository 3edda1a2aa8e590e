//! Process exit codes.
//!
//! | Code | Meaning                              |
//! |------|--------------------------------------|
//! | 0    | Connection success                   |
//! | 1    | Timeout                              |
//! | 2    | Validation error (invalid arguments) |
//! | 3    | Unknown error                        |
//! | 4    | Connection error (host not found)    |

use crate::status::{PollStatus, StatusCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Timeout = 1,
    ValidationError = 2,
    UnknownError = 3,
    ConnectionError = 4,
}

impl ExitCode {
    pub fn from_status(status: &PollStatus) -> Self {
        match status.code() {
            StatusCode::Connected => ExitCode::Success,
            StatusCode::Timeout => ExitCode::Timeout,
            StatusCode::HostNotFound => ExitCode::ConnectionError,
            _ => ExitCode::UnknownError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
