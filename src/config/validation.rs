//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse fine but would
//! leave the relay unusable. All problems are reported at once.

use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyListenerHost,

    #[error("upstream.allowed_hosts must list at least one host")]
    EmptyAllowList,

    #[error("upstream.allowed_hosts[{0}] is blank")]
    BlankAllowedHost(usize),

    #[error("upstream.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("upstream.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyListenerHost);
    }

    let upstream = &config.upstream;
    if upstream.allowed_hosts.is_empty() {
        errors.push(ValidationError::EmptyAllowList);
    }
    for (i, host) in upstream.allowed_hosts.iter().enumerate() {
        if host.trim().is_empty() {
            errors.push(ValidationError::BlankAllowedHost(i));
        }
    }
    if upstream.user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    }
    if upstream.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }
    if upstream.max_body_bytes == Some(0) {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
