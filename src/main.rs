//src/main.rs

use tokio::net::TcpListener;

use secteurs_admin::{
    app,
    common::logging,
    config::{AppState, Settings},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    logging::init(&settings.log_filter);

    let bind_addr = settings.bind_addr.clone();
    let app_state = AppState::new(settings).await?;

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
