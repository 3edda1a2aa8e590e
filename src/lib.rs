//! Wait for a TCP service to accept connections and speak its protocol.

pub mod config;
pub mod exit_code;
pub mod net;
pub mod observability;
pub mod output;
pub mod poll;
pub mod probe;
pub mod ready;
pub mod status;
pub mod target;

pub use poll::{poll, PollParams};
pub use probe::Protocol;
pub use ready::{await_ready, ProbeError};
pub use status::{PollStatus, Status, StatusCode};
