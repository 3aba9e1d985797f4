//! Dependencies injected into the desk reducer.

use crate::advisor::{OverdraftAdvisor, StockLevelAdvisor};
use crate::notify::{NotificationSink, TracingNotifier};
use std::sync::Arc;
use stockroom_core::environment::{Clock, SystemClock};

/// Environment dependencies for the desk reducer
#[derive(Clone)]
pub struct DeskEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Overdraft policy consulted on approval
    pub advisor: Arc<dyn OverdraftAdvisor>,
    /// Destination for user-facing messages
    pub notifier: Arc<dyn NotificationSink>,
}

impl DeskEnvironment {
    /// Creates a new `DeskEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        advisor: Arc<dyn OverdraftAdvisor>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            clock,
            advisor,
            notifier,
        }
    }

    /// System clock, stock-level advisor, log notifications
    #[must_use]
    pub fn production() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(StockLevelAdvisor),
            Arc::new(TracingNotifier),
        )
    }
}

impl std::fmt::Debug for DeskEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeskEnvironment").finish_non_exhaustive()
    }
}
