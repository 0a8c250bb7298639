//! Target locator validation against the upstream allow-list.
//!
//! # Responsibilities
//! - Reject absent or empty locators
//! - Parse the locator as an absolute URL
//! - Match the parsed hostname against the allow-list
//!
//! # Design Decisions
//! - `Substring` matching is the default and accepts any hostname that
//!   contains an allowed entry, so `notopenai.com.evil.org` passes
//! - `Suffix` matching only accepts the entry itself or a subdomain of it
//! - Only the parsed host is inspected, never the raw string

use thiserror::Error;
use url::Url;

use crate::config::{HostMatch, UpstreamConfig};

/// Reasons a client-supplied locator is refused before any fetch happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// No locator, or an empty one.
    #[error("locator missing")]
    Missing,

    /// The locator is not an absolute URL.
    #[error("locator is not a valid URL: {0}")]
    Malformed(#[from] url::ParseError),

    /// The locator's host is not on the allow-list.
    #[error("host {0:?} is not an allowed image source")]
    DisallowedHost(String),
}

/// Allow-list of upstream hosts.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    allowed: Vec<String>,
    mode: HostMatch,
}

impl HostPolicy {
    /// Create a policy. Entries are normalized to lowercase.
    pub fn new<I, S>(allowed: I, mode: HostMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|h| h.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            mode,
        }
    }

    /// Build the policy described by the upstream config section.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(&config.allowed_hosts, config.host_match)
    }

    /// Matching mode in effect.
    pub fn mode(&self) -> HostMatch {
        self.mode
    }

    /// Returns true if `host` is permitted.
    pub fn allows(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.allowed.iter().any(|entry| match self.mode {
            HostMatch::Substring => host.contains(entry.as_str()),
            HostMatch::Suffix => {
                host == *entry
                    || host
                        .strip_suffix(entry.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
        })
    }

    /// Validate a raw locator and return the parsed URL.
    pub fn validate(&self, raw: Option<&str>) -> Result<Url, TargetError> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(TargetError::Missing),
        };

        let url = Url::parse(raw)?;
        let host = url.host_str().unwrap_or_default();
        if !self.allows(host) {
            return Err(TargetError::DisallowedHost(host.to_string()));
        }

        Ok(url)
    }
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self::from_config(&UpstreamConfig::default())
    }
}
