//! Target string parsing.
//!
//! Supported formats:
//! - "3000"                               - localhost:3000, no protocol
//! - ":8080"                              - localhost:8080, no protocol
//! - "db:5432"                            - db:5432, no protocol
//! - "http://localhost:5000/healthcheck"  - with protocol and path
//! - "postgresql://db" / "pg://db"        - default port for the scheme

use thiserror::Error;

use crate::probe::{Protocol, UnknownProtocol};

pub const DEFAULT_HOST: &str = "localhost";

/// Components of a parsed target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("'target' is required")]
    Empty,

    #[error(transparent)]
    UnknownProtocol(#[from] UnknownProtocol),

    #[error("'{0}' is an invalid target, too many ':' separators")]
    TooManySeparators(String),

    #[error("'{target}' is an invalid target, '{port}' is not a valid port number")]
    InvalidPort { target: String, port: String },

    #[error("'{target}' is an invalid target, port {port} is out of range (1 - 65535)")]
    PortOutOfRange { target: String, port: u64 },
}

impl std::str::FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_target(s)
    }
}

pub fn parse_target(target: &str) -> Result<Target, TargetError> {
    if target.is_empty() {
        return Err(TargetError::Empty);
    }

    let (scheme, rest) = match split_scheme(target) {
        Some((scheme, rest)) => (Some(scheme.parse::<Protocol>()?), rest),
        None => (None, target),
    };
    let protocol = scheme.unwrap_or_default();

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], Some(rest[idx..].to_string())),
        None => (rest, None),
    };

    let parts: Vec<&str> = authority.split(':').collect();
    if parts.len() > 2 {
        return Err(TargetError::TooManySeparators(target.to_string()));
    }

    // "scheme://host" without a port: the whole authority is the host.
    if scheme.is_some() && parts.len() == 1 && !parts[0].is_empty() && !is_numeric(parts[0]) {
        if let Some(port) = protocol.default_port() {
            return Ok(Target {
                protocol,
                host: parts[0].to_string(),
                port,
                path,
            });
        }
    }

    let (host, port_str) = match parts.as_slice() {
        [host, port] if !host.is_empty() => (*host, *port),
        [_, port] => (DEFAULT_HOST, *port),
        _ => (DEFAULT_HOST, authority),
    };

    if !is_numeric(port_str) {
        return Err(TargetError::InvalidPort {
            target: target.to_string(),
            port: port_str.to_string(),
        });
    }
    let port = port_str.parse::<u64>().unwrap_or(u64::MAX);
    if !(1..=65535).contains(&port) {
        return Err(TargetError::PortOutOfRange {
            target: target.to_string(),
            port,
        });
    }

    Ok(Target {
        protocol,
        host: host.to_string(),
        port: port as u16,
        path,
    })
}

/// Split a leading `word://`.
fn split_scheme(target: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = target.split_once("://")?;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((scheme, rest))
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
