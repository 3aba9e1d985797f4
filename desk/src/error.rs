//! Errors returned by desk operations.

use crate::types::{Operation, RequestId, RequestStatus};
use serde::Serialize;
use std::fmt;
use stockroom_runtime::StoreError;
use thiserror::Error;

/// Kind of record an operation could not find
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    /// Catalog component
    Component,
    /// Component request
    Request,
    /// Line of a request, keyed by component id
    RequestLine,
    /// Member
    User,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Component => "Component",
            Self::Request => "Request",
            Self::RequestLine => "Request line",
            Self::User => "User",
        })
    }
}

/// Why a desk operation was refused
///
/// Every variant leaves the records untouched. The error travels inside the
/// `OperationFailed` outcome event, so it is cloneable and serializable.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LifecycleError {
    /// Referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// What was looked up
        entity: Entity,
        /// The missing id
        id: String,
    },

    /// Operation not allowed in the request's current status
    #[error("Cannot {} request {request_id} while it is {status}", .operation.verb())]
    InvalidState {
        /// Request the operation targeted
        request_id: RequestId,
        /// Status at the time of the attempt
        status: RequestStatus,
        /// Attempted operation
        operation: Operation,
    },

    /// Approval would push a component below zero
    #[error("Cannot approve {requested} x {component}, only {available} in stock: {reason}")]
    OverdraftRejected {
        /// Component name
        component: String,
        /// Units the line asks for
        requested: u32,
        /// Units on the shelf
        available: u32,
        /// Advisor explanation
        reason: String,
    },

    /// Return would exceed what the line borrowed
    #[error(
        "Cannot return more than was borrowed: {component} has {returned} of {borrowed} back, {attempted} more offered"
    )]
    OverReturn {
        /// Component name
        component: String,
        /// Units on the line
        borrowed: u32,
        /// Units already returned
        returned: u32,
        /// Units in this return
        attempted: u32,
    },

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// The store could not run the operation
    #[error("Store unavailable: {0}")]
    StoreFailure(String),
}

impl LifecycleError {
    /// Shorthand for [`LifecycleError::NotFound`]
    #[must_use]
    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`LifecycleError::Validation`]
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Notification title for this failure
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Not Found",
            Self::InvalidState { .. } => "Invalid Request State",
            Self::OverdraftRejected { .. } => "Overdraft Warning",
            Self::OverReturn { .. } => "Invalid Return",
            Self::Validation(_) => "Invalid Input",
            Self::StoreFailure(_) => "Service Unavailable",
        }
    }

    /// Message shown to the user
    ///
    /// Overdrafts show the advisor's reason, everything else its display text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::OverdraftRejected { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(error: StoreError) -> Self {
        Self::StoreFailure(error.to_string())
    }
}
