//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! RELAY_CONFIG file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → PORT / RELAY_HOST overrides
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → shared via Arc with the HTTP layer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults; with no file and no env the relay listens on 3001
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, load_from_env, ConfigError, LoadedConfig};
pub use schema::{HostMatch, ListenerConfig, ObservabilityConfig, RelayConfig, UpstreamConfig};
