//! Request lifecycle: submission, approval, rejection and returns.
//!
//! Each function validates first and mutates last, so an `Err` always leaves
//! the state as it was. The store runs every call under its write lock; the
//! read-then-write sequence of one operation never interleaves with another.

use crate::advisor::OverdraftAdvisor;
use crate::cart::{Cart, CartItem};
use crate::error::{Entity, LifecycleError};
use crate::state::DeskState;
use crate::types::{
    Component, ComponentId, ComponentRequest, Operation, RequestId, RequestLine, RequestStatus,
    User, UserDetails, UserId,
};
use chrono::{DateTime, Utc};

/// Result of a successful approval
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Approval {
    /// The approved request
    pub request: ComponentRequest,
    /// Every touched component after its decrement, in line order
    pub components: Vec<Component>,
}

/// Result of a successful return
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnReceipt {
    /// Request after the return
    pub request: ComponentRequest,
    /// Component after the restock
    pub component: Component,
}

/// Result of a successful submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// The new pending request
    pub request: ComponentRequest,
    /// Requester as stored
    pub user: User,
}

/// Fields of a member's request form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionForm {
    /// Requester
    pub user_id: UserId,
    /// Requester details
    pub details: UserDetails,
    /// Free-text purpose
    pub purpose: String,
    /// Wanted components
    pub items: Vec<CartItem>,
}

/// Status implied by the returned totals of an approved request
#[must_use]
pub fn status_after_returns(request: &ComponentRequest) -> RequestStatus {
    if request.total_returned() >= request.total_requested() {
        RequestStatus::Returned
    } else {
        RequestStatus::PartiallyReturned
    }
}

/// Creates a pending request and upserts its requester
///
/// # Errors
///
/// - [`LifecycleError::Validation`] for a blank requester name, a zero
///   quantity, an empty item list or a reused request id
/// - [`LifecycleError::NotFound`] if an item names an unknown component
pub fn submit(
    state: &mut DeskState,
    request_id: RequestId,
    form: SubmissionForm,
    now: DateTime<Utc>,
) -> Result<Submission, LifecycleError> {
    if state.requests.exists(&request_id) {
        return Err(LifecycleError::validation(format!(
            "Request {request_id} already exists"
        )));
    }
    if form.details.name.trim().is_empty() {
        return Err(LifecycleError::validation("Requester name cannot be empty"));
    }
    if let Some(item) = form.items.iter().find(|item| item.quantity == 0) {
        return Err(LifecycleError::validation(format!(
            "Quantity for component {} must be greater than zero",
            item.component_id
        )));
    }

    let cart = Cart::from_items(form.items)?;
    if cart.is_empty() {
        return Err(LifecycleError::validation(
            "A request needs at least one component",
        ));
    }

    let items = cart
        .items()
        .iter()
        .map(|item| {
            let component = state.catalog.require(&item.component_id)?;
            Ok(RequestLine {
                component_id: item.component_id.clone(),
                name: component.name.clone(),
                quantity: item.quantity,
                returned_quantity: 0,
            })
        })
        .collect::<Result<Vec<_>, LifecycleError>>()?;

    let user = state.users.upsert(form.user_id, form.details, now);
    let request = ComponentRequest {
        id: request_id,
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        department: user.department.clone(),
        year: user.year.clone(),
        items,
        purpose: form.purpose,
        status: RequestStatus::Pending,
        created_at: now,
        approved_at: None,
    };
    state.requests.insert(request.clone());

    Ok(Submission { request, user })
}

/// Approves a pending request and takes its lines out of stock
///
/// Every line is checked with the advisor against current stock, in order;
/// the first overdraft aborts the whole approval. Decrements are staged with
/// checked subtraction and committed together with the status change.
///
/// # Errors
///
/// - [`LifecycleError::NotFound`] for an unknown request or component
/// - [`LifecycleError::InvalidState`] unless the request is pending
/// - [`LifecycleError::OverdraftRejected`] if any line would overdraw stock
pub fn approve(
    state: &mut DeskState,
    request_id: &RequestId,
    advisor: &dyn OverdraftAdvisor,
    now: DateTime<Utc>,
) -> Result<Approval, LifecycleError> {
    let request = state.requests.require(request_id)?;
    if request.status != RequestStatus::Pending {
        return Err(LifecycleError::InvalidState {
            request_id: request_id.clone(),
            status: request.status,
            operation: Operation::Approve,
        });
    }

    for line in &request.items {
        let component = state.catalog.require(&line.component_id)?;
        let verdict = advisor.evaluate(&component.name, line.quantity, component.quantity);
        if verdict.is_overdraft {
            return Err(LifecycleError::OverdraftRejected {
                component: component.name.clone(),
                requested: line.quantity,
                available: component.quantity,
                reason: verdict.reason,
            });
        }
    }

    let mut staged: Vec<Component> = Vec::with_capacity(request.items.len());
    for line in &request.items {
        let index = match staged.iter().position(|c| c.id == line.component_id) {
            Some(index) => index,
            None => {
                staged.push(state.catalog.require(&line.component_id)?.clone());
                staged.len() - 1
            },
        };
        let component = &mut staged[index];
        component.quantity = component.quantity.checked_sub(line.quantity).ok_or_else(|| {
            LifecycleError::OverdraftRejected {
                component: component.name.clone(),
                requested: line.quantity,
                available: component.quantity,
                reason: format!(
                    "Only {} x {} left once the earlier lines of this request are filled.",
                    component.quantity, component.name
                ),
            }
        })?;
    }

    for component in &staged {
        state.catalog.insert(component.clone());
    }
    let request = state
        .requests
        .get_mut(request_id)
        .ok_or_else(|| LifecycleError::not_found(Entity::Request, request_id))?;
    request.status = RequestStatus::Approved;
    request.approved_at = Some(now);

    tracing::debug!(
        request_id = %request_id,
        lines = request.items.len(),
        "Stock decremented for approval"
    );

    Ok(Approval {
        request: request.clone(),
        components: staged,
    })
}

/// Rejects a pending request; stock is untouched
///
/// # Errors
///
/// - [`LifecycleError::NotFound`] for an unknown request
/// - [`LifecycleError::InvalidState`] unless the request is pending
pub fn reject(
    state: &mut DeskState,
    request_id: &RequestId,
) -> Result<ComponentRequest, LifecycleError> {
    let request = state
        .requests
        .get_mut(request_id)
        .ok_or_else(|| LifecycleError::not_found(Entity::Request, request_id))?;
    if request.status != RequestStatus::Pending {
        return Err(LifecycleError::InvalidState {
            request_id: request_id.clone(),
            status: request.status,
            operation: Operation::Reject,
        });
    }

    request.status = RequestStatus::Rejected;
    Ok(request.clone())
}

/// Puts returned units back on the shelf
///
/// # Errors
///
/// - [`LifecycleError::NotFound`] for an unknown request, a component the
///   request never borrowed, or a component deleted since approval
/// - [`LifecycleError::InvalidState`] unless the request is approved or
///   partially returned
/// - [`LifecycleError::Validation`] for a zero quantity
/// - [`LifecycleError::OverReturn`] if the line would get back more than it
///   borrowed
pub fn register_return(
    state: &mut DeskState,
    request_id: &RequestId,
    component_id: &ComponentId,
    quantity: u32,
) -> Result<ReturnReceipt, LifecycleError> {
    let request = state.requests.require(request_id)?;
    if !request.status.accepts_returns() {
        return Err(LifecycleError::InvalidState {
            request_id: request_id.clone(),
            status: request.status,
            operation: Operation::RegisterReturn,
        });
    }
    let line = request
        .line(component_id)
        .ok_or_else(|| LifecycleError::not_found(Entity::RequestLine, component_id))?;
    if quantity == 0 {
        return Err(LifecycleError::validation(
            "Return quantity must be greater than zero",
        ));
    }

    let returned = line
        .returned_quantity
        .checked_add(quantity)
        .filter(|returned| *returned <= line.quantity)
        .ok_or_else(|| LifecycleError::OverReturn {
            component: line.name.clone(),
            borrowed: line.quantity,
            returned: line.returned_quantity,
            attempted: quantity,
        })?;

    let component = state.catalog.require(component_id)?;
    let restocked = component.quantity.checked_add(quantity).ok_or_else(|| {
        LifecycleError::validation(format!("Stock of {} would overflow", component.name))
    })?;

    let component = state
        .catalog
        .get_mut(component_id)
        .ok_or_else(|| LifecycleError::not_found(Entity::Component, component_id))?;
    component.quantity = restocked;
    let component = component.clone();

    let request = state
        .requests
        .get_mut(request_id)
        .ok_or_else(|| LifecycleError::not_found(Entity::Request, request_id))?;
    if let Some(line) = request
        .items
        .iter_mut()
        .find(|line| &line.component_id == component_id)
    {
        line.returned_quantity = returned;
    }
    request.status = status_after_returns(request);

    Ok(ReturnReceipt {
        request: request.clone(),
        component,
    })
}
