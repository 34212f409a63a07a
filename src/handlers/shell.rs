// src/handlers/shell.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    db::CrudCollection,
    middleware::auth::CurrentSession,
    models::{
        ferme::Ferme,
        navigation::{NavEntry, NavigationQuery},
        shell::{ShellQuery, ShellView},
    },
    services::{
        navigation_service::visible_entries,
        notification_service::{current_count, AggregatorScope},
        shell_service::{compose, MobilePanel, Presentation},
    },
};

// GET /api/navigation?path=
pub async fn get_navigation(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<Vec<NavEntry>>, AppError> {
    let stock_count = current_count(&app_state.store, &AggregatorScope::for_session(&session)).await?;
    Ok(Json(visible_entries(&session.flags, stock_count, &query.path)))
}

// GET /api/shell?path=&width=&menuOpen=
pub async fn get_shell(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<ShellQuery>,
) -> Result<Json<ShellView>, AppError> {
    let stock_count = current_count(&app_state.store, &AggregatorScope::for_session(&session)).await?;

    // A lista de fermes só serve para o rótulo; uma falha não derruba o shell.
    let fermes = match app_state.fermes.list().await {
        Ok(fermes) => fermes,
        Err(e) => {
            tracing::warn!("Falha ao carregar as fermes: {}", e);
            Vec::new()
        }
    };

    let presentation =
        Presentation::for_width(query.width, app_state.settings.desktop_breakpoint_px);
    let view = compose(
        &session,
        &fermes,
        stock_count,
        &query.path,
        presentation,
        MobilePanel::new(query.menu_open),
    );
    Ok(Json(view))
}

// GET /api/fermes
pub async fn list_fermes(
    State(app_state): State<AppState>,
    CurrentSession(_session): CurrentSession,
) -> Result<Json<Vec<Ferme>>, AppError> {
    Ok(Json(app_state.fermes.list().await?))
}
