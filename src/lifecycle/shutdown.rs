//! Programmatic stop for a running relay.
//!
//! `HttpServer::run` drains on OS signals by itself; this handle lets an
//! embedding process (or a test) stop it without one.

use tokio::sync::broadcast;

/// Stop handle for one or more relay servers.
///
/// Hand a `subscribe()` receiver to `HttpServer::run`; `trigger` makes the
/// server stop accepting and finish in-flight relays.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver to pass to `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed server to stop. No-op when none is running.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
