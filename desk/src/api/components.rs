//! Catalog endpoints.
//!
//! - GET /api/components - List components by name
//! - POST /api/components - Add a component
//! - PUT /api/components/:id - Replace a component
//! - DELETE /api/components/:id - Delete a component

use super::error::AppError;
use crate::server::state::AppState;
use crate::types::{Component, ComponentId, NewComponent};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Request to replace a component.
#[derive(Debug, Deserialize)]
pub struct UpdateComponentRequest {
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Units on the shelf
    pub quantity: u32,
    /// Display icon key
    pub icon: String,
}

/// List the catalog.
///
/// ```bash
/// curl http://localhost:8080/api/components
/// ```
pub async fn list_components(State(state): State<AppState>) -> Json<Vec<Component>> {
    Json(state.desk.components().await)
}

/// Add a component.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/components \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Relay Module", "description": "5V single channel", "quantity": 12}'
/// ```
pub async fn create_component(
    State(state): State<AppState>,
    Json(draft): Json<NewComponent>,
) -> Result<(StatusCode, Json<Component>), AppError> {
    let component = state.desk.add_component(draft).await?;
    Ok((StatusCode::CREATED, Json(component)))
}

/// Replace a component.
pub async fn update_component(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateComponentRequest>,
) -> Result<Json<Component>, AppError> {
    let component = Component {
        id: ComponentId::from(id),
        name: request.name,
        description: request.description,
        quantity: request.quantity,
        icon: request.icon,
    };
    Ok(Json(state.desk.update_component(component).await?))
}

/// Delete a component.
pub async fn delete_component(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Component>, AppError> {
    Ok(Json(
        state.desk.delete_component(ComponentId::from(id)).await?,
    ))
}
