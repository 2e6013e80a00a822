//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, workers > 0)
//! - Reject callback parameter names that would not survive form encoding
//! - Detect listener address conflicts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: JsonpdConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::JsonpdConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("jsonp.callback_param must not be empty")]
    EmptyCallbackParam,

    #[error("jsonp.callback_param {0:?} contains characters not allowed in a query key")]
    InvalidCallbackParam(String),

    #[error("jsonp.max_callback_len must be greater than zero")]
    ZeroCallbackLen,

    #[error("listener.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("listener.workers must be greater than zero")]
    ZeroWorkers,

    #[error("{0} must not be empty")]
    EmptyAddress(&'static str),

    #[error("stats.bind_address conflicts with listener.bind_address ({0})")]
    AddressConflict(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &JsonpdConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let param = &config.jsonp.callback_param;
    if param.is_empty() {
        errors.push(ValidationError::EmptyCallbackParam);
    } else if param.chars().any(|c| matches!(c, '&' | '=' | '#' | '+' | '%') || c.is_whitespace()) {
        errors.push(ValidationError::InvalidCallbackParam(param.clone()));
    }

    if config.jsonp.max_callback_len == 0 {
        errors.push(ValidationError::ZeroCallbackLen);
    }
    if config.listener.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.listener.workers == 0 {
        errors.push(ValidationError::ZeroWorkers);
    }

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyAddress("listener.bind_address"));
    }
    if config.stats.enabled {
        if config.stats.bind_address.trim().is_empty() {
            errors.push(ValidationError::EmptyAddress("stats.bind_address"));
        } else if config.stats.bind_address == config.listener.bind_address
            && !config.stats.bind_address.ends_with(":0")
        {
            errors.push(ValidationError::AddressConflict(config.stats.bind_address.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
