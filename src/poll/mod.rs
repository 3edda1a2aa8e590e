//! Poll engine.
//!
//! # Data Flow
//! ```text
//! loop:
//!     connector (ctx.ip_version, remaining budget)
//!     → SOCKET_CONNECTED? probe(protocol) : connect status
//!     → CONNECTED                         → return
//!     → ctx.advance(code)
//!     → both families ENOTFOUND           → HOST_NOT_FOUND (unless wait_for_dns)
//!     → not retryable                     → return status as-is
//!     → deadline passed                   → TIMEOUT
//!     → on_retry(attempt, elapsed), sleep(ctx.next_interval)
//! ```
//!
//! # Design Decisions
//! - One attempt in flight at a time; attempts never retry internally
//! - IPv4 then IPv6 with no delay between them, `interval` between rounds
//! - `timeout == 0` polls until success or a terminal status
//! - The attempt is injectable so the loop can be driven by synthetic statuses

pub mod context;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::net::connector::{self, ConnectParams, ConnectStatus};
use crate::probe::{self, ProbeParams, Protocol, DEFAULT_PROBE_TIMEOUT};
use crate::status::{PollStatus, Status, StatusCode};

pub use context::RetryContext;

/// Callback invoked after a failed attempt, right before the retry delay.
pub type RetryCallback = Arc<dyn Fn(u32, Duration) + Send + Sync>;

/// Minimum accepted retry interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Parameters of one poll.
#[derive(Clone)]
pub struct PollParams {
    pub host: String,
    pub port: u16,
    /// Overall deadline. `Duration::ZERO` polls forever.
    pub timeout: Duration,
    /// Delay between rounds (an IPv4 attempt followed by an IPv6 attempt).
    pub interval: Duration,
    /// Bound on time-to-first-byte for protocol probes.
    pub probe_timeout: Duration,
    pub protocol: Protocol,
    pub path: Option<String>,
    /// Keep polling when both families fail name resolution.
    pub wait_for_dns: bool,
    pub on_retry: Option<RetryCallback>,
}

impl PollParams {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(10),
            interval: Duration::from_millis(500),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            protocol: Protocol::None,
            path: None,
            wait_for_dns: false,
            on_retry: None,
        }
    }
}

impl fmt::Debug for PollParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("interval", &self.interval)
            .field("probe_timeout", &self.probe_timeout)
            .field("protocol", &self.protocol)
            .field("path", &self.path)
            .field("wait_for_dns", &self.wait_for_dns)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

/// Poll `host:port` until it is ready, a terminal status is reached, or the
/// deadline passes.
pub async fn poll(params: &PollParams) -> PollStatus {
    let span = tracing::info_span!(
        "poll",
        poll_id = %Uuid::new_v4(),
        host = %params.host,
        port = params.port,
        protocol = %params.protocol,
    );
    poll_with(params, |ctx, budget| attempt(params, ctx, budget))
        .instrument(span)
        .await
}

/// One connect-then-probe attempt.
async fn attempt(params: &PollParams, ctx: RetryContext, connect_timeout: Duration) -> Status {
    let connected = connector::connect(ConnectParams {
        host: &params.host,
        port: params.port,
        ip_version: ctx.ip_version,
        timeout: connect_timeout,
    })
    .await;

    match connected {
        ConnectStatus::Connected(stream) => {
            let probe_params = ProbeParams {
                timeout: params.probe_timeout,
                path: params.path.as_deref(),
            };
            probe::probe(params.protocol, stream, probe_params).await
        }
        ConnectStatus::Failed(status) => status,
    }
}

/// Drive the retry loop with an arbitrary attempt function.
///
/// `attempt` receives the context for the attempt and the connect budget
/// (`Duration::ZERO` when there is no deadline).
pub async fn poll_with<F, Fut>(params: &PollParams, mut attempt: F) -> PollStatus
where
    F: FnMut(RetryContext, Duration) -> Fut,
    Fut: Future<Output = Status>,
{
    let start = Instant::now();
    let mut ctx = RetryContext::initial();

    loop {
        let status = attempt(ctx, connect_budget(params.timeout, start.elapsed())).await;
        let code = status.code();

        if code == StatusCode::Connected {
            tracing::info!(
                attempt = ctx.attempt,
                elapsed_ms = start.elapsed().as_millis() as u64,
                detail = status.message(),
                "Service is ready"
            );
            return PollStatus::narrow(status);
        }

        let next = ctx.advance(code, params.interval);

        if next.host_not_found() && !params.wait_for_dns {
            tracing::warn!(attempt = ctx.attempt, "Host not found on IPv4 and IPv6");
            return PollStatus::narrow(status.recode(
                StatusCode::HostNotFound,
                format!("Host not found: {}", params.host),
            ));
        }

        if !code.is_retryable() {
            tracing::warn!(attempt = ctx.attempt, status = %status, "Giving up");
            return PollStatus::narrow(status);
        }

        let elapsed = start.elapsed();
        if !params.timeout.is_zero() && elapsed > params.timeout {
            tracing::warn!(
                attempt = ctx.attempt,
                elapsed_ms = elapsed.as_millis() as u64,
                "Timed out"
            );
            return PollStatus::narrow(status.recode(
                StatusCode::Timeout,
                format!(
                    "Timed out after {}ms waiting for {}:{}",
                    params.timeout.as_millis(),
                    params.host,
                    params.port
                ),
            ));
        }

        tracing::debug!(
            attempt = ctx.attempt,
            ip_version = %ctx.ip_version,
            code = %code,
            next_delay_ms = next.next_interval.as_millis() as u64,
            "Retrying"
        );

        if let Some(on_retry) = &params.on_retry {
            on_retry(ctx.attempt, elapsed);
        }

        if !next.next_interval.is_zero() {
            time::sleep(next.next_interval).await;
        }
        ctx = next;
    }
}

/// Time left before the deadline, never zero while a deadline exists.
fn connect_budget(timeout: Duration, elapsed: Duration) -> Duration {
    if timeout.is_zero() {
        return Duration::ZERO;
    }
    timeout.saturating_sub(elapsed).max(Duration::from_millis(1))
}
