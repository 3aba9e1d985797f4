//! Domain types for the lending desk.
//!
//! Components are the physical stock, requests borrow from it, users are the
//! members who submit requests. Every record is keyed by an opaque string id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new random id
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the id as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a catalog component
    ComponentId
);

string_id!(
    /// Unique identifier for a component request
    RequestId
);

string_id!(
    /// Unique identifier for a member
    UserId
);

/// Ties a command to the outcome event the reducer produces for it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Creates a new random `CorrelationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Icon key used when a component is added without one
pub const DEFAULT_ICON: &str = "Cpu";

/// A physical inventory item with a tracked quantity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component ID
    pub id: ComponentId,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Units on the shelf
    pub quantity: u32,
    /// Display icon key
    pub icon: String,
}

/// Fields an administrator fills in to add a component
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComponent {
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Initial stock
    pub quantity: u32,
    /// Display icon key, [`DEFAULT_ICON`] when absent
    #[serde(default)]
    pub icon: Option<String>,
}

impl NewComponent {
    /// Turns the draft into a catalog entry with the given id
    #[must_use]
    pub fn into_component(self, id: ComponentId) -> Component {
        Component {
            id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            icon: self.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Lifecycle status of a request
///
/// `pending → approved | rejected`, `approved → partially-returned | returned`,
/// `partially-returned → returned`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    /// Waiting for an administrator
    Pending,
    /// Stock handed out
    Approved,
    /// Refused, terminal
    Rejected,
    /// Some units are back
    PartiallyReturned,
    /// Everything is back, terminal
    Returned,
}

impl RequestStatus {
    /// Whether returns may be registered against a request in this status
    #[must_use]
    pub const fn accepts_returns(self) -> bool {
        matches!(self, Self::Approved | Self::PartiallyReturned)
    }

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PartiallyReturned => "partially-returned",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One component-and-quantity entry within a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLine {
    /// Borrowed component
    pub component_id: ComponentId,
    /// Component name when the request was submitted
    pub name: String,
    /// Units requested, fixed at submission
    pub quantity: u32,
    /// Units back on the shelf so far
    pub returned_quantity: u32,
}

impl RequestLine {
    /// Units still out
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.returned_quantity)
    }
}

/// A member's ask to borrow components for a purpose
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRequest {
    /// Request ID
    pub id: RequestId,
    /// Requester
    pub user_id: UserId,
    /// Requester name at submission
    pub user_name: String,
    /// Requester department at submission
    pub department: String,
    /// Requester year of study at submission
    pub year: String,
    /// Requested lines, in submission order
    pub items: Vec<RequestLine>,
    /// Free-text purpose
    pub purpose: String,
    /// Lifecycle status
    pub status: RequestStatus,
    /// Submission time
    pub created_at: DateTime<Utc>,
    /// Approval time
    pub approved_at: Option<DateTime<Utc>>,
}

impl ComponentRequest {
    /// Line for `component_id`, if the request has one
    #[must_use]
    pub fn line(&self, component_id: &ComponentId) -> Option<&RequestLine> {
        self.items.iter().find(|line| &line.component_id == component_id)
    }

    /// Sum of requested units over all lines
    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of returned units over all lines
    #[must_use]
    pub fn total_returned(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.returned_quantity))
            .sum()
    }
}

// ============================================================================
// Users
// ============================================================================

/// Requester details submitted with a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Department
    pub department: String,
    /// Year of study
    pub year: String,
}

/// A member of the stockroom
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Department
    pub department: String,
    /// Year of study
    pub year: String,
    /// First time the user was seen
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user from submitted details
    #[must_use]
    pub fn from_details(id: UserId, details: UserDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: details.name,
            email: details.email,
            department: details.department,
            year: details.year,
            created_at,
        }
    }

    /// Replaces the editable fields, keeping id and creation time
    pub fn apply_details(&mut self, details: UserDetails) {
        self.name = details.name;
        self.email = details.email;
        self.department = details.department;
        self.year = details.year;
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Mutating operations offered by the desk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Member submits a request
    SubmitRequest,
    /// Administrator approves a request
    Approve,
    /// Administrator rejects a request
    Reject,
    /// Administrator registers returned units
    RegisterReturn,
    /// Administrator adds a component
    AddComponent,
    /// Administrator edits a component
    UpdateComponent,
    /// Administrator deletes a component
    DeleteComponent,
    /// Administrator edits a user
    UpdateUser,
}

impl Operation {
    /// Metric and log label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubmitRequest => "submit_request",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RegisterReturn => "register_return",
            Self::AddComponent => "add_component",
            Self::UpdateComponent => "update_component",
            Self::DeleteComponent => "delete_component",
            Self::UpdateUser => "update_user",
        }
    }

    /// Human phrasing used in error messages
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::SubmitRequest => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RegisterReturn => "register a return against",
            Self::AddComponent => "add a component to",
            Self::UpdateComponent => "update a component of",
            Self::DeleteComponent => "delete a component of",
            Self::UpdateUser => "update the user of",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
