//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts bounded, log level known)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::Config;

/// Upper bound for any configured timeout: one day.
pub const MAX_TIMEOUT_MILLIS: u64 = 24 * 60 * 60 * 1000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("client.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("{field} = {value} exceeds the maximum of {max} ms")]
    TimeoutTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Check a parsed config, collecting every problem found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.client.user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    }

    let timeouts = [
        ("client.default_timeout_millis", config.client.default_timeout_millis),
        ("client.connect_timeout_millis", config.client.connect_timeout_millis),
    ];
    for (field, value) in timeouts {
        if value > MAX_TIMEOUT_MILLIS {
            errors.push(ValidationError::TimeoutTooLarge {
                field,
                value,
                max: MAX_TIMEOUT_MILLIS,
            });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
