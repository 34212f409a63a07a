// src/db/pg_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgListener, types::Json, FromRow, PgPool, QueryBuilder};
use std::{sync::Arc, time::Duration};
use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use crate::{
    common::{db_utils::push_filters, error::AppError},
    db::live_query::{spawn_feeder, Change, Document, DocumentStore, Filter, Subscription},
};

// Canal do NOTIFY disparado pelo trigger da tabela `documents` (ver migrations/)
pub const CHANGES_CHANNEL: &str = "documents_changed";

// Espera entre tentativas de (re)conexão do listener
const RELAY_RETRY: Duration = Duration::from_secs(2);

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Value>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document { id: row.id, data: row.data.0 }
    }
}

// O document store sobre Postgres: uma tabela JSONB + LISTEN/NOTIFY como feed.
// Um único PgListener por store (uma conexão do pool); as assinaturas só
// recebem o feed via broadcast e reconsultam com conexões emprestadas.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    changes: broadcast::Sender<Change>,
    _relay: Arc<RelayTask>,
}

struct RelayTask(JoinHandle<()>);

impl Drop for RelayTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(256);
        let relay = tokio::spawn(relay(pool.clone(), changes.clone()));
        Self { pool, changes, _relay: Arc::new(RelayTask(relay)) }
    }

    async fn fetch(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, AppError> {
        let mut builder =
            QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(collection.to_string());
        push_filters(&mut builder, filters);
        builder.push(" ORDER BY seq ASC");

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn list(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, AppError> {
        self.fetch(collection, filters).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn insert(&self, collection: &str, data: Value) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Json(data))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn put(&self, collection: &str, id: &str, data: Value) -> Result<(), AppError> {
        // UPSERT: substitui o documento inteiro se já existir
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), AppError> {
        // `||` faz o merge raso de objetos JSONB
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(patch))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(collection, id));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(collection, id));
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> Result<Subscription, AppError> {
        // Inscreve no feed antes do snapshot inicial para não perder mudanças.
        let changes = self.changes.subscribe();
        let initial = self.fetch(collection, &filters).await?;
        let store = self.clone();
        let name = collection.to_string();

        Ok(spawn_feeder(collection.to_string(), initial, changes, move || {
            let store = store.clone();
            let name = name.clone();
            let filters = filters.clone();
            async move { store.fetch(&name, &filters).await }
        }))
    }
}

// Repassa os NOTIFY da tabela `documents` para o broadcast do store.
// Após cada (re)conexão manda um `Resync`: o que chegou enquanto o listener
// estava fora não é reenviado pelo Postgres.
async fn relay(pool: PgPool, changes: broadcast::Sender<Change>) {
    loop {
        let mut listener = match PgListener::connect_with(&pool).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::warn!("Falha ao conectar o listener: {}", e);
                tokio::time::sleep(RELAY_RETRY).await;
                continue;
            }
        };
        if let Err(e) = listener.listen(CHANGES_CHANNEL).await {
            tracing::warn!("Falha no LISTEN {}: {}", CHANGES_CHANNEL, e);
            tokio::time::sleep(RELAY_RETRY).await;
            continue;
        }
        tracing::debug!("Listener de mudanças ativo");
        let _ = changes.send(Change::Resync);

        loop {
            match listener.try_recv().await {
                Ok(Some(notification)) => {
                    let _ = changes.send(Change::Updated(notification.payload().to_string()));
                }
                // Conexão perdida; o próximo try_recv reconecta
                Ok(None) => {
                    tracing::warn!("Listener desconectado; reconectando");
                    let _ = changes.send(Change::Resync);
                }
                Err(e) => {
                    tracing::warn!("Listener encerrado: {}", e);
                    break;
                }
            }
        }
        tokio::time::sleep(RELAY_RETRY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    // Muitas assinaturas simultâneas num pool mínimo: o listener compartilhado
    // usa uma conexão e as consultas continuam sendo atendidas.
    #[tokio::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn subscriptions_do_not_hold_pool_connections() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(2))
            .connect(&url)
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        let store = PgStore::new(pool);
        let collection = format!("teste_{}", Uuid::new_v4().simple());

        let mut subs = Vec::new();
        for _ in 0..6 {
            let mut sub = store.subscribe(&collection, vec![]).await.unwrap();
            assert!(sub.next().await.unwrap().is_empty());
            subs.push(sub);
        }

        store.insert(&collection, json!({ "k": "a" })).await.unwrap();
        for sub in subs.iter_mut() {
            let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
                loop {
                    let docs = sub.next().await.unwrap();
                    if !docs.is_empty() {
                        return docs;
                    }
                }
            })
            .await
            .unwrap();
            assert_eq!(snapshot.len(), 1);
        }
        assert_eq!(store.list(&collection, &[]).await.unwrap().len(), 1);
    }
}
