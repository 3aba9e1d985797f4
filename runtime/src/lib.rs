//! # Stockroom Runtime
//!
//! The Store runtime that coordinates reducer execution and effect handling.
//!
//! - **Store**: owns state, runs the reducer, executes effects
//! - **Feedback loop**: actions produced by effects are broadcast to
//!   subscribers and fed back into the reducer
//!
//! ## Example
//!
//! ```ignore
//! use stockroom_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! store.send(Action::DoSomething).await?;
//!
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use stockroom_core::{effect::Effect, reducer::Reducer};
use tokio::sync::RwLock;

pub use error::StoreError;
pub use store::Store;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Every effect of the sent action finished without a match
        #[error("Effects finished without a matching action")]
        NoReply,
    }
}

/// Configuration for a [`Store`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of effect-produced actions buffered for slow subscribers.
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Set the action broadcast capacity.
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
        }
    }
}

/// Decrements the pending-effect counter when an effect task ends.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - the runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, Duration, Effect, Ordering, PendingGuard, Reducer, RwLock,
        StoreConfig, StoreError,
    };
    use tokio::sync::{broadcast, mpsc};

    /// Where actions produced by one dispatch chain are copied for its caller.
    type Reply<A> = Option<mpsc::UnboundedSender<A>>;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Every action is reduced while the write lock is held, so two actions
    /// never observe each other's partial work.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Actions produced by effects (e.g. `Effect::Future`) are broadcast
        /// here before being fed back.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Releases the lock and starts the returned effects
        ///
        /// `send()` returns once effects are started, not when they finish.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            self.dispatch(action, None).await;
            Ok(())
        }

        /// Send an action and wait for a matching result action
        ///
        /// Every action produced by the effects of this action, and of the
        /// actions those feed back, is copied to a channel owned by this call.
        /// The first one matching `predicate` is returned. Other callers and
        /// slow broadcast subscribers cannot make this call miss its reply.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action before `timeout`
        /// - [`StoreError::NoReply`]: all effects finished without a match
        /// - [`StoreError::ShutdownInProgress`]: store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let (reply, mut replies) = mpsc::unbounded_channel();
            self.dispatch(action, Some(reply)).await;

            tokio::time::timeout(timeout, async {
                while let Some(action) = replies.recv().await {
                    if predicate(&action) {
                        return Ok(action);
                    }
                }
                Err(StoreError::NoReply)
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to every action produced by effects.
        ///
        /// Initial actions passed to `send` are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.items.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Number of effect tasks still running.
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Whether `shutdown` has been initiated.
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Wait until no effect task is running.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
        /// still running if `timeout` elapses first.
        pub async fn wait_idle(&self, timeout: Duration) -> Result<(), StoreError> {
            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects();
                if pending == 0 {
                    return Ok(());
                }
                if start.elapsed() >= timeout {
                    return Err(StoreError::ShutdownTimeout(pending));
                }
                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Rejects new actions, then waits for running effects to finish.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            match self.wait_idle(timeout).await {
                Ok(()) => {
                    tracing::info!("All effects completed, shutdown successful");
                    Ok(())
                },
                Err(error) => {
                    tracing::error!(%error, "Shutdown timeout");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    Err(error)
                },
            }
        }

        /// Reduce one action under the write lock and start its effects.
        async fn dispatch(&self, action: A, reply: Reply<A>) {
            metrics::counter!("store.commands.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, reply.clone());
            }
        }

        fn execute_effect(&self, effect: Effect<A>, reply: Reply<A>) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = PendingGuard(Arc::clone(&self.pending_effects));
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _pending_guard = pending_guard;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, feeding back");
                            if let Some(reply) = &reply {
                                // The caller may have timed out already
                                let _ = reply.send(action.clone());
                            }
                            // No receivers is fine
                            let _ = store.action_broadcast.send(action.clone());
                            store.dispatch(action, reply).await;
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stockroom_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum TallyAction {
        Add(u32),
        Announce(u32),
        Announced(u32),
        Stall,
    }

    #[derive(Clone)]
    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = u32;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut u32,
            action: TallyAction,
            _env: &(),
        ) -> SmallVec<[Effect<TallyAction>; 4]> {
            match action {
                TallyAction::Add(n) => {
                    *state += n;
                    SmallVec::new()
                },
                TallyAction::Announce(n) => {
                    *state += n;
                    smallvec![Effect::emit(TallyAction::Announced(*state))]
                },
                TallyAction::Stall => smallvec![Effect::Future(Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Some(TallyAction::Announced(0))
                }))],
                TallyAction::Announced(_) => SmallVec::new(),
            }
        }
    }

    #[tokio::test]
    async fn send_updates_state() {
        let store = Store::new(0, TallyReducer, ());
        store.send(TallyAction::Add(3)).await.unwrap();
        store.send(TallyAction::Add(4)).await.unwrap();
        assert_eq!(store.state(|s| *s).await, 7);
    }

    #[tokio::test]
    async fn send_and_wait_for_returns_fed_back_action() {
        let store = Store::new(10, TallyReducer, ());
        let result = store
            .send_and_wait_for(
                TallyAction::Announce(5),
                |a| matches!(a, TallyAction::Announced(_)),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(result, TallyAction::Announced(15));
    }

    #[tokio::test]
    async fn send_and_wait_for_without_effects_has_no_reply() {
        let store = Store::new(0, TallyReducer, ());
        let result = store
            .send_and_wait_for(
                TallyAction::Add(1),
                |a| matches!(a, TallyAction::Announced(_)),
                Duration::from_secs(1),
            )
            .await;
        assert_eq!(result, Err(StoreError::NoReply));
        assert_eq!(store.state(|s| *s).await, 1);
    }

    #[tokio::test]
    async fn send_and_wait_for_times_out_on_slow_effect() {
        let store = Store::new(0, TallyReducer, ());
        let result = store
            .send_and_wait_for(
                TallyAction::Stall,
                |a| matches!(a, TallyAction::Announced(_)),
                Duration::from_millis(20),
            )
            .await;
        assert_eq!(result, Err(StoreError::Timeout));
    }

    #[tokio::test]
    async fn send_and_wait_for_ignores_other_callers_replies() {
        let store = Store::new(0, TallyReducer, ());
        store.send(TallyAction::Announce(1)).await.unwrap();

        let result = store
            .send_and_wait_for(
                TallyAction::Announce(2),
                |a| matches!(a, TallyAction::Announced(_)),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(result, TallyAction::Announced(3));
    }

    #[tokio::test]
    async fn send_and_wait_for_refuses_during_shutdown() {
        let store = Store::new(0, TallyReducer, ());
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        let result = store
            .send_and_wait_for(TallyAction::Announce(1), |_| true, Duration::from_secs(1))
            .await;
        assert_eq!(result, Err(StoreError::ShutdownInProgress));
        assert_eq!(store.state(|s| *s).await, 0);
    }

    #[tokio::test]
    async fn subscribers_see_only_effect_actions() {
        let store = Store::new(0, TallyReducer, ());
        let mut rx = store.subscribe_actions();

        store.send(TallyAction::Announce(2)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), TallyAction::Announced(2));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = Store::new(0, TallyReducer, ());
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        assert!(store.is_shutting_down());
        assert_eq!(
            store.send(TallyAction::Add(1)).await,
            Err(StoreError::ShutdownInProgress)
        );
        assert_eq!(store.state(|s| *s).await, 0);
    }

    #[tokio::test]
    async fn wait_idle_drains_effects() {
        let store = Store::new(0, TallyReducer, ());
        store.send(TallyAction::Announce(1)).await.unwrap();
        store.wait_idle(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.pending_effects(), 0);
    }
}
