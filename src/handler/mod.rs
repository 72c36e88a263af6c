//! Request handler module
//!
//! Routing table dispatch plus the two handlers of the site surface: the
//! root document route and the static asset lookup.

pub mod root;
pub mod router;
pub mod static_files;

// Re-export the main entry point and the routing table
pub use router::{handle_request, RouteTable};
