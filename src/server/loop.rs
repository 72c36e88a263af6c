// Server loop module
// Accept loop with graceful, signal-driven shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::ShutdownSignal;
use crate::config::AppState;
use crate::logger;

/// How long shutdown waits for in-flight connections before giving up
const SHUTDOWN_DRAIN_LIMIT: Duration = Duration::from_secs(5);

/// Run the accept loop until a shutdown signal arrives.
///
/// Each accepted connection is served on its own task; the loop itself only
/// accepts and hands off. On shutdown the listener is dropped first so no
/// new connections land, then in-flight connections get a bounded drain.
pub async fn run_accept_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<ShutdownSignal>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if shutdown.requested.load(Ordering::SeqCst) {
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notify.notified() => {
                break;
            }
        }
    }

    // Stop accepting before draining
    drop(listener);
    drain_connections(&active_connections).await;
    logger::log_shutdown_complete();

    Ok(())
}

/// Wait for in-flight connections to finish, up to the drain limit.
async fn drain_connections(active_connections: &Arc<AtomicUsize>) {
    let deadline = tokio::time::Instant::now() + SHUTDOWN_DRAIN_LIMIT;

    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_shutdown_drain_timeout(active_connections.load(Ordering::SeqCst));
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
