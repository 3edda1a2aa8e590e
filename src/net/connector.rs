//! Outbound TCP connector.
//!
//! # Responsibilities
//! - Resolve the host for one address family
//! - Open one TCP connection, bounded by an optional local timer
//! - Classify every socket-level failure into a `Status`
//!
//! # Design Decisions
//! - Exactly one resolution per call; the timer is dropped with the future
//! - A timeout drops the in-flight connect, which closes the socket
//! - The connected stream is handed over unread, so a server that speaks
//!   first (MySQL) loses nothing before the probe starts reading
//! - Resolution and address-availability failures are scoped to the family
//!   that was tried

use std::fmt;
use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::{lookup_host, TcpStream};
use tokio::time;

use crate::status::{Status, StatusCode};

/// IP address family used for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// The other family.
    pub fn flip(self) -> Self {
        match self {
            IpVersion::V4 => IpVersion::V6,
            IpVersion::V6 => IpVersion::V4,
        }
    }

    pub fn matches(self, addr: &IpAddr) -> bool {
        matches!(
            (self, addr),
            (IpVersion::V4, IpAddr::V4(_)) | (IpVersion::V6, IpAddr::V6(_))
        )
    }

    pub fn as_u8(self) -> u8 {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPv{}", self.as_u8())
    }
}

/// Parameters for a single connect attempt.
#[derive(Debug, Clone, Copy)]
pub struct ConnectParams<'a> {
    pub host: &'a str,
    pub port: u16,
    pub ip_version: IpVersion,
    /// Local timer. `Duration::ZERO` leaves the OS as the only bound.
    pub timeout: Duration,
}

/// Result of a connect attempt.
///
/// Only the `Connected` variant carries a socket, and it always does.
#[derive(Debug)]
pub enum ConnectStatus {
    Connected(TcpStream),
    Failed(Status),
}

impl ConnectStatus {
    pub fn code(&self) -> StatusCode {
        match self {
            ConnectStatus::Connected(_) => StatusCode::SocketConnected,
            ConnectStatus::Failed(status) => status.code(),
        }
    }
}

/// Attempt one TCP connection to `host:port` over the given family.
pub async fn connect(params: ConnectParams<'_>) -> ConnectStatus {
    tracing::debug!(
        host = params.host,
        port = params.port,
        ip_version = %params.ip_version,
        "Connecting"
    );

    bounded(establish(params.host, params.port, params.ip_version), params.timeout).await
}

/// Race `attempt` against the local connect timer.
///
/// On expiry the attempt is dropped along with any socket it holds.
async fn bounded<F>(attempt: F, timeout: Duration) -> ConnectStatus
where
    F: Future<Output = ConnectStatus>,
{
    if timeout.is_zero() {
        return attempt.await;
    }

    match time::timeout(timeout, attempt).await {
        Ok(status) => status,
        Err(_) => {
            let ms = timeout.as_millis();
            tracing::debug!(timeout_ms = ms as u64, "Connection timeout");
            ConnectStatus::Failed(Status::new(
                StatusCode::Timeout,
                format!("Connection timeout after {}ms", ms),
            ))
        }
    }
}

async fn establish(host: &str, port: u16, ip_version: IpVersion) -> ConnectStatus {
    let addrs = match resolve(host, port, ip_version).await {
        Ok(addrs) => addrs,
        Err(status) => return ConnectStatus::Failed(status),
    };

    let mut last_failure = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                tracing::debug!(%addr, "Connected");
                return ConnectStatus::Connected(stream);
            }
            Err(e) => {
                tracing::trace!(%addr, error = %e, "Connect failed");
                last_failure = Some(classify_connect_error(e));
            }
        }
    }

    ConnectStatus::Failed(last_failure.unwrap_or_else(|| {
        Status::new(
            StatusCode::NotFound,
            format!("No {} address for {}", ip_version, host),
        )
    }))
}

/// Resolve `host` to the addresses of one family.
///
/// IP literals bypass resolution and are used as-is, whatever the family.
async fn resolve(host: &str, port: u16, ip_version: IpVersion) -> Result<Vec<SocketAddr>, Status> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let resolved = lookup_host((host, port)).await.map_err(|e| {
        tracing::debug!(host, error = %e, "Lookup failed");
        Status::with_cause(
            StatusCode::NotFound,
            format!("Socket cannot be opened: ENOTFOUND ({})", ip_version),
            e,
        )
    })?;

    let addrs: Vec<SocketAddr> = resolved
        .filter(|addr| ip_version.matches(&addr.ip()))
        .collect();
    if addrs.is_empty() {
        tracing::debug!(host, ip_version = %ip_version, "No address for family");
        return Err(Status::new(
            StatusCode::NotFound,
            format!("Socket cannot be opened: no {} address for {}", ip_version, host),
        ));
    }
    Ok(addrs)
}

/// Map an OS-level connect error into the status taxonomy.
pub fn classify_connect_error(err: io::Error) -> Status {
    use io::ErrorKind;

    let (code, message) = match err.kind() {
        ErrorKind::ConnectionRefused => (StatusCode::ConnRefused, "Socket not open: ECONNREFUSED"),
        ErrorKind::PermissionDenied => (StatusCode::AccessDenied, "Socket not open: EACCES"),
        ErrorKind::ConnectionReset => (StatusCode::ConnReset, "Socket not open: ECONNRESET"),
        ErrorKind::TimedOut => (StatusCode::Timeout, "Socket not open: ETIMEDOUT"),
        ErrorKind::AddrNotAvailable => {
            (StatusCode::NotFound, "Socket cannot be opened: EADDRNOTAVAIL")
        }
        ErrorKind::NetworkUnreachable => {
            (StatusCode::NotFound, "Socket cannot be opened: ENETUNREACH")
        }
        ErrorKind::HostUnreachable => (StatusCode::NotFound, "Socket cannot be opened: EHOSTUNREACH"),
        _ => (StatusCode::Unknown, "Unknown error"),
    };
    Status::with_cause(code, message, err)
}
