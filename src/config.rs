// src/config.rs

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::{env, sync::Arc, time::Duration};

use crate::{
    common::logging::DEFAULT_FILTER,
    db::{Collection, MemoryStore, PgStore, SharedStore, UserRepository},
    models::{ferme::Ferme, supervisor::Supervisor},
    services::{auth::AuthService, supervisor_service::SupervisorService},
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DESKTOP_BREAKPOINT_PX: u32 = 1024;

// Configuração lida do ambiente (.env incluído)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub desktop_breakpoint_px: u32,
    pub db_max_connections: u32,
    pub log_filter: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let desktop_breakpoint_px = match env::var("DESKTOP_BREAKPOINT_PX") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DESKTOP_BREAKPOINT_PX inválido: '{}'", raw))?,
            Err(_) => DEFAULT_DESKTOP_BREAKPOINT_PX,
        };
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", raw))?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            desktop_breakpoint_px,
            db_max_connections,
            log_filter: DEFAULT_FILTER.to_string(),
        })
    }
}

// O estado compartilhado, montado explicitamente na raiz de composição.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub settings: Arc<Settings>,
    pub auth_service: AuthService,
    pub supervisor_service: SupervisorService,
    pub fermes: Collection<Ferme>,
}

impl AppState {
    /// Conecta ao Postgres (e roda as migrações) quando há DATABASE_URL;
    /// senão usa o store em memória.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let store: SharedStore = match &settings.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&db_pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgStore::new(db_pool))
            }
            None => {
                tracing::warn!("DATABASE_URL ausente: usando o store em memória");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(settings, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(settings: Settings, store: SharedStore) -> Self {
        let user_repo = UserRepository::new(store.clone());
        let auth_service = AuthService::new(user_repo, settings.jwt_secret.clone());
        let supervisor_service =
            SupervisorService::new(Arc::new(Collection::<Supervisor>::new(store.clone())));
        let fermes = Collection::new(store.clone());

        Self {
            store,
            settings: Arc::new(settings),
            auth_service,
            supervisor_service,
            fermes,
        }
    }
}
