// Application state module
// Immutable per-process state shared by every connection task.

use crate::handler::RouteTable;

use super::types::Config;

/// Application state
///
/// Everything here is fixed at startup: the validated configuration and the
/// routing table derived from it. Connection tasks share it behind an `Arc`;
/// no locking is needed because nothing mutates after construction.
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            routes: RouteTable::build(),
            config,
        }
    }
}
