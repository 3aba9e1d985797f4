//! Request/response facade over the desk store.
//!
//! Every mutating call sends one command with a fresh correlation id and waits
//! for the outcome event with the same id. The store hands that event to the
//! sender directly, so a lagging subscriber never turns a commit into a failure.

use crate::actions::DeskAction;
use crate::cart::CartItem;
use crate::config::DeskConfig;
use crate::environment::DeskEnvironment;
use crate::error::LifecycleError;
use crate::lifecycle::{Approval, ReturnReceipt, Submission};
use crate::notify::{Notification, NotificationSink};
use crate::reducer::DeskReducer;
use crate::reports::{self, WeeklyReport};
use crate::state::DeskState;
use crate::types::{
    Component, ComponentId, ComponentRequest, CorrelationId, NewComponent, Operation, RequestId,
    RequestStatus, User, UserDetails, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use stockroom_core::environment::Clock;
use stockroom_runtime::{Store, StoreConfig, StoreError};
use tokio::sync::broadcast;

/// Store running the desk reducer
pub type DeskStore = Store<DeskState, DeskAction, DeskEnvironment, DeskReducer>;

/// Lending desk: the operations members and administrators call
#[derive(Clone)]
pub struct LendingDesk {
    store: DeskStore,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSink>,
    operation_timeout: Duration,
    report_window: chrono::Duration,
}

impl LendingDesk {
    /// Starts a store over `initial` with the given environment
    #[must_use]
    pub fn new(initial: DeskState, environment: DeskEnvironment, config: &DeskConfig) -> Self {
        let clock = Arc::clone(&environment.clock);
        let notifier = Arc::clone(&environment.notifier);
        let store = Store::with_config(
            initial,
            DeskReducer::new(),
            environment,
            StoreConfig::default().with_broadcast_capacity(config.broadcast_capacity),
        );
        Self {
            store,
            clock,
            notifier,
            operation_timeout: config.operation_timeout(),
            report_window: config.report_window(),
        }
    }

    // ========== Commands ==========

    /// Submits a request on behalf of `user_id`
    ///
    /// # Errors
    ///
    /// Any [`LifecycleError`] from validation, or `StoreFailure`.
    pub async fn submit_request(
        &self,
        user_id: UserId,
        details: UserDetails,
        purpose: String,
        items: Vec<CartItem>,
    ) -> Result<Submission, LifecycleError> {
        let correlation_id = CorrelationId::new();
        let action = DeskAction::SubmitRequest {
            correlation_id,
            request_id: RequestId::new(),
            user_id,
            details,
            purpose,
            items,
        };
        match self.execute(action).await? {
            DeskAction::RequestSubmitted { request, user, .. } => Ok(Submission { request, user }),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Approves a pending request
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState`, `OverdraftRejected` or `StoreFailure`.
    pub async fn approve(&self, request_id: RequestId) -> Result<Approval, LifecycleError> {
        let action = DeskAction::Approve {
            correlation_id: CorrelationId::new(),
            request_id,
        };
        match self.execute(action).await? {
            DeskAction::RequestApproved {
                request,
                components,
                ..
            } => Ok(Approval {
                request,
                components,
            }),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Rejects a pending request
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` or `StoreFailure`.
    pub async fn reject(&self, request_id: RequestId) -> Result<ComponentRequest, LifecycleError> {
        let action = DeskAction::Reject {
            correlation_id: CorrelationId::new(),
            request_id,
        };
        match self.execute(action).await? {
            DeskAction::RequestRejected { request, .. } => Ok(request),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Registers `quantity` units of `component_id` coming back
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState`, `Validation`, `OverReturn` or `StoreFailure`.
    pub async fn register_return(
        &self,
        request_id: RequestId,
        component_id: ComponentId,
        quantity: u32,
    ) -> Result<ReturnReceipt, LifecycleError> {
        let action = DeskAction::RegisterReturn {
            correlation_id: CorrelationId::new(),
            request_id,
            component_id,
            quantity,
        };
        match self.execute(action).await? {
            DeskAction::ReturnRegistered {
                request, component, ..
            } => Ok(ReturnReceipt { request, component }),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Adds a component under a new id
    ///
    /// # Errors
    ///
    /// `Validation` or `StoreFailure`.
    pub async fn add_component(&self, draft: NewComponent) -> Result<Component, LifecycleError> {
        let action = DeskAction::AddComponent {
            correlation_id: CorrelationId::new(),
            component: draft.into_component(ComponentId::new()),
        };
        match self.execute(action).await? {
            DeskAction::ComponentAdded { component, .. } => Ok(component),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Replaces an existing component
    ///
    /// # Errors
    ///
    /// `NotFound`, `Validation` or `StoreFailure`.
    pub async fn update_component(
        &self,
        component: Component,
    ) -> Result<Component, LifecycleError> {
        let action = DeskAction::UpdateComponent {
            correlation_id: CorrelationId::new(),
            component,
        };
        match self.execute(action).await? {
            DeskAction::ComponentUpdated { component, .. } => Ok(component),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Deletes a component, returning what was removed
    ///
    /// # Errors
    ///
    /// `NotFound` or `StoreFailure`.
    pub async fn delete_component(
        &self,
        component_id: ComponentId,
    ) -> Result<Component, LifecycleError> {
        let action = DeskAction::DeleteComponent {
            correlation_id: CorrelationId::new(),
            component_id,
        };
        match self.execute(action).await? {
            DeskAction::ComponentDeleted { component, .. } => Ok(component),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Replaces a user's details
    ///
    /// # Errors
    ///
    /// `NotFound`, `Validation` or `StoreFailure`.
    pub async fn update_user(
        &self,
        user_id: UserId,
        details: UserDetails,
    ) -> Result<User, LifecycleError> {
        let action = DeskAction::UpdateUser {
            correlation_id: CorrelationId::new(),
            user_id,
            details,
        };
        match self.execute(action).await? {
            DeskAction::UserUpdated { user, .. } => Ok(user),
            other => Err(Self::unexpected(&other)),
        }
    }

    // ========== Reads ==========

    /// Components ordered by name
    pub async fn components(&self) -> Vec<Component> {
        self.store.state(|s| s.catalog.list_by_name()).await
    }

    /// One component
    pub async fn component(&self, id: &ComponentId) -> Option<Component> {
        self.store.state(|s| s.catalog.get(id).cloned()).await
    }

    /// Requests newest first, optionally only those in `status`
    pub async fn requests(&self, status: Option<RequestStatus>) -> Vec<ComponentRequest> {
        self.store
            .state(|s| match status {
                Some(status) => s.requests.with_status(status),
                None => s.requests.list_newest_first(),
            })
            .await
    }

    /// One request
    pub async fn request(&self, id: &RequestId) -> Option<ComponentRequest> {
        self.store.state(|s| s.requests.get(id).cloned()).await
    }

    /// Approval queue
    pub async fn pending_requests(&self) -> Vec<ComponentRequest> {
        self.store.state(|s| s.requests.pending()).await
    }

    /// Requests with units still out
    pub async fn outstanding_requests(&self) -> Vec<ComponentRequest> {
        self.store.state(|s| s.requests.outstanding()).await
    }

    /// Users newest first
    pub async fn users(&self) -> Vec<User> {
        self.store.state(|s| s.users.list_newest_first()).await
    }

    /// One user
    pub async fn user(&self, id: &UserId) -> Option<User> {
        self.store.state(|s| s.users.get(id).cloned()).await
    }

    /// Requests submitted by `user_id`, newest first
    pub async fn user_requests(&self, user_id: &UserId) -> Vec<ComponentRequest> {
        self.store.state(|s| s.requests.for_user(user_id)).await
    }

    /// Weekly usage report as of now
    pub async fn weekly_report(&self) -> WeeklyReport {
        let now = self.clock.now();
        let window = self.report_window;
        self.store
            .state(|s| reports::weekly_report(s.requests.iter(), now, window))
            .await
    }

    // ========== Lifecycle ==========

    /// Every outcome event from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeskAction> {
        self.store.subscribe_actions()
    }

    /// Whether the desk still accepts commands
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        !self.store.is_shutting_down()
    }

    /// Waits for in-flight notifications to finish
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] if effects are still running after `timeout`.
    pub async fn settle(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.wait_idle(timeout).await
    }

    /// Stops accepting commands and drains running effects
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] if effects are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    /// Sends a command and waits for its outcome
    async fn execute(&self, action: DeskAction) -> Result<DeskAction, LifecycleError> {
        let correlation_id = action.correlation_id();
        let operation = action.operation();

        let outcome = self
            .store
            .send_and_wait_for(
                action,
                move |candidate| candidate.answers(correlation_id),
                self.operation_timeout,
            )
            .await;

        match outcome {
            Ok(DeskAction::OperationFailed { error, .. }) => {
                Self::record(operation, "rejected");
                Err(error)
            },
            Ok(event) => {
                Self::record(operation, "ok");
                Ok(event)
            },
            Err(store_error) => {
                Self::record(operation, "store_failure");
                tracing::error!(
                    %correlation_id,
                    %operation,
                    error = %store_error,
                    "Store could not complete operation"
                );
                let error = LifecycleError::from(store_error);
                self.notifier.notify(Notification::from_error(&error));
                Err(error)
            },
        }
    }

    fn record(operation: Operation, outcome: &'static str) {
        metrics::counter!(
            "desk.operations.total",
            "operation" => operation.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }

    fn unexpected(event: &DeskAction) -> LifecycleError {
        tracing::error!(operation = %event.operation(), "Outcome did not match its command");
        LifecycleError::StoreFailure(format!(
            "unexpected outcome for {}",
            event.operation()
        ))
    }
}

impl std::fmt::Debug for LendingDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LendingDesk")
            .field("operation_timeout", &self.operation_timeout)
            .field("report_window", &self.report_window)
            .finish_non_exhaustive()
    }
}
