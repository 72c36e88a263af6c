// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// Windows builds fall back to Ctrl+C only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Shutdown coordination state
pub struct ShutdownSignal {
    /// Notified when shutdown is requested
    pub notify: Arc<Notify>,
    /// Set once shutdown has been requested
    pub requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    fn trigger(&self, signal_name: &str) {
        logger::log_shutdown_requested(signal_name);
        self.requested.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so a signal arriving before the accept
        // loop first awaits is not lost
        self.notify.notify_one();
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the signal listener task (Unix).
///
/// SIGTERM and SIGINT both trigger graceful shutdown: the accept loop stops,
/// in-flight connections drain, and the process exits 0.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<ShutdownSignal>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => shutdown.trigger("SIGTERM"),
            _ = sigint.recv() => shutdown.trigger("SIGINT"),
        }
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<ShutdownSignal>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            shutdown.trigger("Ctrl+C");
        }
    });
}
