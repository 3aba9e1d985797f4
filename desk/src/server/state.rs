//! Application state for the lending desk HTTP server.

use crate::desk::LendingDesk;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; the desk itself is a cheap handle to the store.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Lending desk facade
    pub desk: LendingDesk,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(desk: LendingDesk) -> Self {
        Self { desk }
    }
}
