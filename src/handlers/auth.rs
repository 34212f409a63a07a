// src/handlers/auth.rs

use axum::{extract::State, Json};

use crate::{
    config::AppState,
    middleware::auth::CurrentSession,
    models::auth::{LogoutResponse, MeResponse},
};

// Handler da rota protegida /me
pub async fn get_me(CurrentSession(session): CurrentSession) -> Json<MeResponse> {
    Json(MeResponse {
        role_label: session.identity.role.label(),
        flags: session.flags,
        identity: session.identity,
    })
}

// Logout "fire-and-forget": o cliente sempre volta para /login
pub async fn logout(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Json<LogoutResponse> {
    app_state.auth_service.logout(&session);
    Json(LogoutResponse { redirect_to: "/login" })
}
