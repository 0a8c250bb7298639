//! Observability subsystem.
//!
//! Logging only: structured `tracing` events, with one span per request
//! carrying its `x-request-id`.

pub mod logging;

pub use logging::init_logging;
