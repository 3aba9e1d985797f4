//! Request lifecycle endpoints.
//!
//! - GET /api/requests - List requests, optionally by status
//! - POST /api/requests - Submit a request
//! - GET /api/requests/:id - Request details
//! - POST /api/requests/:id/approve - Approve a pending request
//! - POST /api/requests/:id/reject - Reject a pending request
//! - POST /api/requests/:id/returns - Register returned units

use super::error::AppError;
use crate::cart::CartItem;
use crate::server::state::AppState;
use crate::types::{
    Component, ComponentId, ComponentRequest, RequestId, RequestStatus, User, UserDetails, UserId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing requests.
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    /// Filter by status
    pub status: Option<RequestStatus>,
}

/// Request to submit a component request.
#[derive(Debug, Deserialize)]
pub struct SubmitRequestBody {
    /// Requester
    pub user_id: String,
    /// Requester details
    #[serde(flatten)]
    pub details: UserDetails,
    /// Free-text purpose
    #[serde(default)]
    pub purpose: String,
    /// Wanted components
    pub items: Vec<CartItem>,
}

/// Response after submitting a request.
#[derive(Debug, Serialize)]
pub struct SubmitRequestResponse {
    /// The pending request
    pub request: ComponentRequest,
    /// Requester as stored
    pub user: User,
}

/// Response after approving a request.
#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    /// The approved request
    pub request: ComponentRequest,
    /// Components after the decrement
    pub components: Vec<Component>,
}

/// Request to register returned units.
#[derive(Debug, Deserialize)]
pub struct ReturnBody {
    /// Returned component
    pub component_id: String,
    /// Units returned
    pub quantity: u32,
}

/// Response after registering a return.
#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    /// Request after the return
    pub request: ComponentRequest,
    /// Component after the restock
    pub component: Component,
}

// ============================================================================
// Handlers
// ============================================================================

/// List requests newest first.
///
/// ```bash
/// curl http://localhost:8080/api/requests?status=pending
/// ```
pub async fn list_requests(
    Query(query): Query<ListRequestsQuery>,
    State(state): State<AppState>,
) -> Json<Vec<ComponentRequest>> {
    Json(state.desk.requests(query.status).await)
}

/// Submit a request.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/requests \
///   -H "Content-Type: application/json" \
///   -d '{
///     "user_id": "user-alice",
///     "name": "Alice Johnson",
///     "email": "alice@example.edu",
///     "department": "Electrical Engineering",
///     "year": "3rd",
///     "purpose": "Plant watering system",
///     "items": [{"component_id": "1", "quantity": 2}]
///   }'
/// ```
pub async fn submit_request(
    State(state): State<AppState>,
    Json(body): Json<SubmitRequestBody>,
) -> Result<(StatusCode, Json<SubmitRequestResponse>), AppError> {
    if body.user_id.trim().is_empty() {
        return Err(AppError::bad_request("user_id is required"));
    }
    let submission = state
        .desk
        .submit_request(
            UserId::from(body.user_id),
            body.details,
            body.purpose,
            body.items,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitRequestResponse {
            request: submission.request,
            user: submission.user,
        }),
    ))
}

/// Request details.
pub async fn get_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ComponentRequest>, AppError> {
    let id = RequestId::from(id);
    state
        .desk
        .request(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Request", &id))
}

/// Approve a pending request.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/requests/req-1/approve
/// ```
pub async fn approve_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApproveResponse>, AppError> {
    let approval = state.desk.approve(RequestId::from(id)).await?;
    Ok(Json(ApproveResponse {
        request: approval.request,
        components: approval.components,
    }))
}

/// Reject a pending request.
pub async fn reject_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ComponentRequest>, AppError> {
    Ok(Json(state.desk.reject(RequestId::from(id)).await?))
}

/// Register returned units.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/requests/req-3/returns \
///   -H "Content-Type: application/json" \
///   -d '{"component_id": "1", "quantity": 1}'
/// ```
pub async fn register_return(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<ReturnBody>,
) -> Result<Json<ReturnResponse>, AppError> {
    let receipt = state
        .desk
        .register_return(
            RequestId::from(id),
            ComponentId::from(body.component_id),
            body.quantity,
        )
        .await?;
    Ok(Json(ReturnResponse {
        request: receipt.request,
        component: receipt.component,
    }))
}
