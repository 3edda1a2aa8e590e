//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port present and non-zero, interval >= 10ms)
//! - Validate free-form strings (path, log format)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AwaitConfig → Result<(), Vec<ValidationError>>
//! - Runs after command-line overrides, before polling starts

use std::fmt;

use crate::config::schema::AwaitConfig;
use crate::poll::MIN_INTERVAL;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &AwaitConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.target.host.trim().is_empty() {
        errors.push(ValidationError {
            field: "target.host",
            message: "host must not be empty".into(),
        });
    }

    match config.target.port {
        None => errors.push(ValidationError {
            field: "target.port",
            message: "a port is required (1 - 65535)".into(),
        }),
        Some(0) => errors.push(ValidationError {
            field: "target.port",
            message: "port 0 is out of range (1 - 65535)".into(),
        }),
        Some(_) => {}
    }

    if let Some(path) = &config.target.path {
        if !path.starts_with('/') {
            errors.push(ValidationError {
                field: "target.path",
                message: format!("path '{}' must start with '/'", path),
            });
        }
    }

    let min_interval_ms = MIN_INTERVAL.as_millis() as u64;
    if config.poll.interval_ms < min_interval_ms {
        errors.push(ValidationError {
            field: "poll.interval_ms",
            message: format!("interval must be at least {}ms", min_interval_ms),
        });
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError {
            field: "observability.log_format",
            message: format!(
                "unknown log format '{}' (expected pretty or json)",
                config.observability.log_format
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
