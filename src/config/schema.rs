//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section is optional; missing fields fall back to the defaults below.

use std::time::Duration;

use serde::Deserialize;

use crate::output::OutputMode;
use crate::poll::PollParams;
use crate::probe::Protocol;
use crate::target::DEFAULT_HOST;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AwaitConfig {
    /// What to wait for.
    pub target: TargetConfig,

    /// Retry and timeout settings.
    pub poll: PollConfig,

    /// Terminal output.
    pub output: OutputConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Target configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Host name or IP literal.
    pub host: String,

    /// TCP port. Required, either here or on the command line.
    pub port: Option<u16>,

    /// Protocol to probe after connecting.
    pub protocol: Protocol,

    /// HTTP request path.
    pub path: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: None,
            protocol: Protocol::None,
            path: None,
        }
    }
}

/// Poll configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Overall timeout in milliseconds (0 waits forever).
    pub timeout_ms: u64,

    /// Delay between rounds in milliseconds.
    pub interval_ms: u64,

    /// Time-to-first-byte bound for protocol probes in milliseconds.
    pub probe_timeout_ms: u64,

    /// Keep waiting when the host does not resolve.
    pub wait_for_dns: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            interval_ms: 1_000,
            probe_timeout_ms: 500,
            wait_for_dns: false,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Log format: "pretty" or "json".
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl AwaitConfig {
    /// Build poll parameters. Call only after validation, which guarantees a port.
    pub fn poll_params(&self) -> PollParams {
        let mut params = PollParams::new(self.target.host.clone(), self.target.port.unwrap_or_default());
        params.timeout = Duration::from_millis(self.poll.timeout_ms);
        params.interval = Duration::from_millis(self.poll.interval_ms);
        params.probe_timeout = Duration::from_millis(self.poll.probe_timeout_ms);
        params.protocol = self.target.protocol;
        params.path = self.target.path.clone();
        params.wait_for_dns = self.poll.wait_for_dns;
        params
    }
}
