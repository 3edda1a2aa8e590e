//! Retry context threaded through the poll loop.
//!
//! # State Transitions
//! ```text
//! attempt n over IPv4 fails → attempt n+1 over IPv6, no delay
//! attempt n over IPv6 fails → attempt n+1 over IPv4, after `interval`
//! ENOTFOUND on a family     → that family's not-found flag set for good
//! ```

use std::time::Duration;

use crate::net::connector::IpVersion;
use crate::status::StatusCode;

/// Per-poll retry state. A new value is produced for every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// 1-based number of the attempt about to run.
    pub attempt: u32,
    /// Family for the attempt about to run.
    pub ip_version: IpVersion,
    /// Sticky: IPv4 has returned ENOTFOUND at least once.
    pub ipv4_not_found: bool,
    /// Sticky: IPv6 has returned ENOTFOUND at least once.
    pub ipv6_not_found: bool,
    /// Delay before the attempt about to run.
    pub next_interval: Duration,
}

impl RetryContext {
    pub fn initial() -> Self {
        Self {
            attempt: 1,
            ip_version: IpVersion::V4,
            ipv4_not_found: false,
            ipv6_not_found: false,
            next_interval: Duration::ZERO,
        }
    }

    /// Context for the next attempt, given the code of the one that just failed.
    pub fn advance(&self, code: StatusCode, interval: Duration) -> Self {
        let tried = self.ip_version;
        let not_found = code == StatusCode::NotFound;
        Self {
            attempt: self.attempt + 1,
            ip_version: tried.flip(),
            ipv4_not_found: self.ipv4_not_found || (not_found && tried == IpVersion::V4),
            ipv6_not_found: self.ipv6_not_found || (not_found && tried == IpVersion::V6),
            next_interval: match tried {
                IpVersion::V4 => Duration::ZERO,
                IpVersion::V6 => interval,
            },
        }
    }

    /// Both families have failed name resolution.
    pub fn host_not_found(&self) -> bool {
        self.ipv4_not_found && self.ipv6_not_found
    }
}

impl Default for RetryContext {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(250);

    #[test]
    fn alternates_families_with_delay_only_after_ipv6() {
        let first = RetryContext::initial();
        assert_eq!(first.ip_version, IpVersion::V4);

        let second = first.advance(StatusCode::ConnRefused, INTERVAL);
        assert_eq!(second.attempt, 2);
        assert_eq!(second.ip_version, IpVersion::V6);
        assert_eq!(second.next_interval, Duration::ZERO);

        let third = second.advance(StatusCode::ConnRefused, INTERVAL);
        assert_eq!(third.attempt, 3);
        assert_eq!(third.ip_version, IpVersion::V4);
        assert_eq!(third.next_interval, INTERVAL);
    }

    #[test]
    fn not_found_flag_is_scoped_to_tried_family() {
        let ctx = RetryContext::initial().advance(StatusCode::NotFound, INTERVAL);
        assert!(ctx.ipv4_not_found);
        assert!(!ctx.ipv6_not_found);
        assert!(!ctx.host_not_found());

        let ctx = ctx.advance(StatusCode::NotFound, INTERVAL);
        assert!(ctx.host_not_found());
    }

    #[test]
    fn not_found_flags_are_sticky() {
        let ctx = RetryContext::initial()
            .advance(StatusCode::NotFound, INTERVAL)
            .advance(StatusCode::ConnRefused, INTERVAL)
            .advance(StatusCode::ConnRefused, INTERVAL)
            .advance(StatusCode::NotFound, INTERVAL);
        assert!(ctx.ipv4_not_found);
        assert!(ctx.ipv6_not_found);
    }

    #[test]
    fn should_use_ipv4_does_not_mark_not_found() {
        let ctx = RetryContext::initial()
            .advance(StatusCode::ConnRefused, INTERVAL)
            .advance(StatusCode::ShouldUseIpV4, INTERVAL);
        assert!(!ctx.ipv6_not_found);
        assert_eq!(ctx.ip_version, IpVersion::V4);
    }
}
