//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section falls back to defaults so an empty file is a valid config.

use std::net::{Ipv6Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// User agent sent with every upstream fetch.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; ImageProxy/1.0)";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Upstream fetch policy.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. Overridden by the `PORT` environment variable.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`. IPv6 literals
    /// are bracketed.
    pub fn bind_address(&self) -> String {
        match self.host.parse::<Ipv6Addr>() {
            Ok(ip) => SocketAddr::from((ip, self.port)).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// How a target hostname is compared against `allowed_hosts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HostMatch {
    /// Hostname contains an allowed entry anywhere.
    #[default]
    Substring,
    /// Hostname equals an allowed entry or is a subdomain of it.
    Suffix,
}

/// Upstream fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Host fragments an image locator must match.
    pub allowed_hosts: Vec<String>,

    /// Matching strategy for `allowed_hosts`.
    pub host_match: HostMatch,

    /// User-Agent header for outbound requests.
    pub user_agent: String,

    /// Total deadline for one upstream fetch in seconds. `None` waits forever.
    pub timeout_secs: Option<u64>,

    /// Largest upstream body accepted, in bytes. `None` buffers anything.
    pub max_body_bytes: Option<usize>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: vec![
                "openai.com".to_string(),
                "blob.core.windows.net".to_string(),
            ],
            host_match: HostMatch::Substring,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
            max_body_bytes: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
