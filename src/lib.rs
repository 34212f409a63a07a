// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, middleware::auth::auth_guard};

/// Monta o router completo. Tudo abaixo de /api exige sessão, exceto /api/health.
pub fn app(app_state: AppState) -> Router {
    let auth_routes = Router::new().route("/logout", post(handlers::auth::logout));

    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let shell_routes = Router::new()
        .route("/navigation", get(handlers::shell::get_navigation))
        .route("/shell", get(handlers::shell::get_shell))
        .route("/fermes", get(handlers::shell::list_fermes));

    let notification_routes = Router::new()
        .route("/stock", get(handlers::notifications::get_stock_count))
        .route("/stock/stream", get(handlers::notifications::stream_stock_count));

    let supervisor_routes = Router::new()
        .route(
            "/",
            get(handlers::supervisors::list_supervisors)
                .post(handlers::supervisors::create_supervisor),
        )
        .route(
            "/{id}",
            put(handlers::supervisors::update_supervisor)
                .delete(handlers::supervisors::delete_supervisor),
        );

    let protected = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/notifications", notification_routes)
        .nest("/supervisors", supervisor_routes)
        .merge(shell_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
