//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! (host, port, ip_version, timeout)
//!     → connector.rs (resolve for one family, connect, classify failure)
//!     → ConnectStatus::Connected(TcpStream) handed to a probe
//!       or ConnectStatus::Failed(Status) handed back to the poll engine
//! ```
//!
//! # Design Decisions
//! - Outbound only; nothing here listens
//! - The stream is moved, never shared: connector → probe → dropped

pub mod connector;

pub use connector::{connect, ConnectParams, ConnectStatus, IpVersion};
