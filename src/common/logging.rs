use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Filtro padrão quando RUST_LOG não está definido
pub const DEFAULT_FILTER: &str = "secteurs_admin=info,tower_http=info";

/// Inicializa o logger. `RUST_LOG` tem precedência sobre `default_filter`.
/// Chamadas repetidas (ex.: em testes) são ignoradas.
pub fn init(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).compact())
        .try_init();
}
