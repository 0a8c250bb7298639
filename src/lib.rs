//! Image relay library.
//!
//! Fetches images from an allow-listed set of upstream hosts and hands them
//! back to browsers either as raw bytes or as a base64 data URI.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
