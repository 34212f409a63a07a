// src/handlers/notifications.rs

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{stream, Stream};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentSession,
    models::stock::StockNotificationCount,
    services::notification_service::{current_count, AggregatorScope, NotificationAggregator},
};

const COUNT_EVENT: &str = "stock-count";

fn count_event(count: u32) -> Result<Event, axum::Error> {
    Event::default()
        .event(COUNT_EVENT)
        .json_data(StockNotificationCount { count })
}

// GET /api/notifications/stock
pub async fn get_stock_count(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<StockNotificationCount>, AppError> {
    let count = current_count(&app_state.store, &AggregatorScope::for_session(&session)).await?;
    Ok(Json(StockNotificationCount { count }))
}

// GET /api/notifications/stock/stream
// Um agregador por conexão; ele vive dentro do stream e é destruído
// (com as duas assinaturas) quando o cliente desconecta.
pub async fn stream_stock_count(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let aggregator = NotificationAggregator::start(app_state.store.clone(), Some(&session)).await?;
    let watcher = aggregator.watch();

    tracing::info!(user = %session.identity.id, "Stream de notificações aberto");

    // O primeiro evento já traz a contagem real (após os snapshots iniciais)
    let events = stream::unfold(
        (aggregator, watcher, true),
        |(aggregator, mut watcher, first)| async move {
            let count = if first { watcher.ready().await? } else { watcher.next().await? };
            Some((count_event(count), (aggregator, watcher, false)))
        },
    );

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
