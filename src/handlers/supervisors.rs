// src/handlers/supervisors.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{CapAdministration, RequireCapability},
    models::supervisor::{
        DeleteSupervisorQuery, RegistryView, SupervisorCreated, SupervisorInput, SupervisorMessage,
    },
    services::supervisor_service::{SupervisorRegistry, MSG_CREATED, MSG_DELETED, MSG_UPDATED},
};

// GET /api/supervisors
pub async fn list_supervisors(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CapAdministration>,
) -> Result<Json<RegistryView>, AppError> {
    let supervisors = app_state.supervisor_service.list().await?;
    Ok(Json(SupervisorRegistry::new().view(&supervisors)))
}

// POST /api/supervisors
pub async fn create_supervisor(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CapAdministration>,
    Json(payload): Json<SupervisorInput>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.supervisor_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(SupervisorCreated { id, message: MSG_CREATED })))
}

// PUT /api/supervisors/{id}
pub async fn update_supervisor(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CapAdministration>,
    Path(id): Path<String>,
    Json(payload): Json<SupervisorInput>,
) -> Result<Json<SupervisorMessage>, AppError> {
    app_state.supervisor_service.update(&id, payload).await?;
    Ok(Json(SupervisorMessage { message: MSG_UPDATED }))
}

// DELETE /api/supervisors/{id}?confirm=true
pub async fn delete_supervisor(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CapAdministration>,
    Path(id): Path<String>,
    Query(query): Query<DeleteSupervisorQuery>,
) -> Result<Json<SupervisorMessage>, AppError> {
    app_state.supervisor_service.delete(&id, query.confirm).await?;
    Ok(Json(SupervisorMessage { message: MSG_DELETED }))
}
