//! User endpoints.
//!
//! - GET /api/users - List users newest first
//! - PUT /api/users/:id - Replace a user's details
//! - GET /api/users/:id/requests - Member request history

use super::error::AppError;
use crate::server::state::AppState;
use crate::types::{ComponentRequest, User, UserDetails, UserId};
use axum::{
    Json,
    extract::{Path, State},
};

/// List users.
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.desk.users().await)
}

/// Replace a user's details.
///
/// ```bash
/// curl -X PUT http://localhost:8080/api/users/user-alice \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Alice Johnson", "email": "alice@example.edu", "department": "EE", "year": "4th"}'
/// ```
pub async fn update_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(details): Json<UserDetails>,
) -> Result<Json<User>, AppError> {
    Ok(Json(
        state.desk.update_user(UserId::from(id), details).await?,
    ))
}

/// Requests submitted by one user.
pub async fn user_requests(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ComponentRequest>>, AppError> {
    let id = UserId::from(id);
    if state.desk.user(&id).await.is_none() {
        return Err(AppError::not_found("User", &id));
    }
    Ok(Json(state.desk.user_requests(&id).await))
}
