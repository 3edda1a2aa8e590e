//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! connector, probes, poll engine
//!     → tracing events (debug: attempts and classifications,
//!                       info/warn: terminal outcomes)
//!     → `poll` span with poll_id, host, port, protocol
//!     → logging.rs subscriber (stderr, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; the binary installs the subscriber
//! - Quiet by default (warn), `RUST_LOG` overrides configuration

pub mod logging;
