// Server module entry point
// Listener construction, accept loop, per-connection service, signal handling.

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module file gets an explicit path
#[path = "loop.rs"]
pub mod server_loop;

// Re-export the startup surface
pub use listener::create_listener;
pub use server_loop::run_accept_loop;
pub use signal::{start_signal_handler, ShutdownSignal};
