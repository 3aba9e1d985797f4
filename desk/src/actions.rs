//! Inputs to the desk reducer.
//!
//! Commands ask for a mutation. Each one is answered by exactly one outcome
//! event carrying the same correlation id: the success event for the command,
//! or `OperationFailed`.

use crate::cart::CartItem;
use crate::error::LifecycleError;
use crate::types::{
    Component, ComponentId, ComponentRequest, CorrelationId, Operation, RequestId, User,
    UserDetails, UserId,
};

/// Commands and outcome events of the lending desk
#[derive(Clone, Debug, PartialEq)]
pub enum DeskAction {
    // ========== Commands ==========
    /// Member submits a request
    SubmitRequest {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// ID for the new request
        request_id: RequestId,
        /// Requester
        user_id: UserId,
        /// Requester details, upserted into the directory
        details: UserDetails,
        /// Free-text purpose
        purpose: String,
        /// Wanted components
        items: Vec<CartItem>,
    },

    /// Administrator approves a pending request
    Approve {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Request to approve
        request_id: RequestId,
    },

    /// Administrator rejects a pending request
    Reject {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Request to reject
        request_id: RequestId,
    },

    /// Administrator records units coming back
    RegisterReturn {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Request the units were borrowed under
        request_id: RequestId,
        /// Returned component
        component_id: ComponentId,
        /// Units returned
        quantity: u32,
    },

    /// Administrator adds a component
    AddComponent {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// New catalog entry
        component: Component,
    },

    /// Administrator edits a component
    UpdateComponent {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Replacement entry, matched by id
        component: Component,
    },

    /// Administrator deletes a component
    DeleteComponent {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Component to delete
        component_id: ComponentId,
    },

    /// Administrator edits a user
    UpdateUser {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// User to edit
        user_id: UserId,
        /// Replacement details
        details: UserDetails,
    },

    // ========== Outcome events ==========
    /// A request was created
    RequestSubmitted {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// The pending request
        request: ComponentRequest,
        /// Requester as stored
        user: User,
    },

    /// A request was approved and stock decremented
    RequestApproved {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// The approved request
        request: ComponentRequest,
        /// Components after the decrement
        components: Vec<Component>,
    },

    /// A request was rejected
    RequestRejected {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// The rejected request
        request: ComponentRequest,
    },

    /// Units went back on the shelf
    ReturnRegistered {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Request after the return
        request: ComponentRequest,
        /// Component after the restock
        component: Component,
        /// Units returned
        quantity: u32,
    },

    /// A component was added
    ComponentAdded {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Stored component
        component: Component,
    },

    /// A component was edited
    ComponentUpdated {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Stored component
        component: Component,
    },

    /// A component was deleted
    ComponentDeleted {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// The removed component
        component: Component,
    },

    /// A user was edited
    UserUpdated {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Stored user
        user: User,
    },

    /// A command was refused and nothing changed
    OperationFailed {
        /// Correlation ID
        correlation_id: CorrelationId,
        /// Refused operation
        operation: Operation,
        /// Reason
        error: LifecycleError,
    },
}

impl DeskAction {
    /// Correlation ID of the command or event
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        match self {
            Self::SubmitRequest { correlation_id, .. }
            | Self::Approve { correlation_id, .. }
            | Self::Reject { correlation_id, .. }
            | Self::RegisterReturn { correlation_id, .. }
            | Self::AddComponent { correlation_id, .. }
            | Self::UpdateComponent { correlation_id, .. }
            | Self::DeleteComponent { correlation_id, .. }
            | Self::UpdateUser { correlation_id, .. }
            | Self::RequestSubmitted { correlation_id, .. }
            | Self::RequestApproved { correlation_id, .. }
            | Self::RequestRejected { correlation_id, .. }
            | Self::ReturnRegistered { correlation_id, .. }
            | Self::ComponentAdded { correlation_id, .. }
            | Self::ComponentUpdated { correlation_id, .. }
            | Self::ComponentDeleted { correlation_id, .. }
            | Self::UserUpdated { correlation_id, .. }
            | Self::OperationFailed { correlation_id, .. } => *correlation_id,
        }
    }

    /// Operation the command requests or the event answers
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::SubmitRequest { .. } | Self::RequestSubmitted { .. } => Operation::SubmitRequest,
            Self::Approve { .. } | Self::RequestApproved { .. } => Operation::Approve,
            Self::Reject { .. } | Self::RequestRejected { .. } => Operation::Reject,
            Self::RegisterReturn { .. } | Self::ReturnRegistered { .. } => {
                Operation::RegisterReturn
            },
            Self::AddComponent { .. } | Self::ComponentAdded { .. } => Operation::AddComponent,
            Self::UpdateComponent { .. } | Self::ComponentUpdated { .. } => {
                Operation::UpdateComponent
            },
            Self::DeleteComponent { .. } | Self::ComponentDeleted { .. } => {
                Operation::DeleteComponent
            },
            Self::UpdateUser { .. } | Self::UserUpdated { .. } => Operation::UpdateUser,
            Self::OperationFailed { operation, .. } => *operation,
        }
    }

    /// Whether this is an outcome event rather than a command
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        !matches!(
            self,
            Self::SubmitRequest { .. }
                | Self::Approve { .. }
                | Self::Reject { .. }
                | Self::RegisterReturn { .. }
                | Self::AddComponent { .. }
                | Self::UpdateComponent { .. }
                | Self::DeleteComponent { .. }
                | Self::UpdateUser { .. }
        )
    }

    /// Whether this outcome answers the command with `correlation_id`
    #[must_use]
    pub fn answers(&self, correlation_id: CorrelationId) -> bool {
        self.is_outcome() && self.correlation_id() == correlation_id
    }
}
