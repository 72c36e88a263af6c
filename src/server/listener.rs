// Listener construction
// Builds the TCP listener with explicit socket options via socket2.

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create the server's `TcpListener`.
///
/// `SO_REUSEADDR` allows rebinding an address still in `TIME_WAIT` after a
/// quick restart. Any failure here is fatal to startup: the caller reports
/// it and exits non-zero.
pub fn create_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // Allow binding to a port in TIME_WAIT state
    socket.set_reuse_address(true)?;

    // Non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;

    // Backlog queue size of 128
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
