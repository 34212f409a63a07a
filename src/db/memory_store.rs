// src/db/memory_store.rs

use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::live_query::{
        matches_all, shallow_merge, spawn_feeder, Change, Document, DocumentStore, Filter,
        Subscription,
    },
};

// Store em memória: usado em desenvolvimento (sem DATABASE_URL) e nos testes.
// Mantém a ordem de inserção, que é a "ordem do provedor" vista pelas listas.
#[derive(Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
    changes: broadcast::Sender<Change>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self { collections: Arc::new(RwLock::new(HashMap::new())), changes }
    }

    /// Encerra todas as assinaturas ativas de uma coleção, como faria uma
    /// queda de rede ou uma revogação de permissão no store remoto.
    pub fn disconnect(&self, collection: &str) {
        let _ = self.changes.send(Change::Disconnected(collection.to_string()));
    }

    fn poisoned() -> AppError {
        AppError::StoreUnavailable("lock do store em memória envenenado".into())
    }

    fn snapshot(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches_all(filters, &doc.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn notify(&self, collection: &str) {
        // Sem assinantes o envio falha; não é um erro.
        let _ = self.changes.send(Change::Updated(collection.to_string()));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, AppError> {
        self.snapshot(collection, filters)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id).cloned()))
    }

    async fn insert(&self, collection: &str, data: Value) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        {
            let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
            collections
                .entry(collection.to_string())
                .or_default()
                .push(Document { id: id.clone(), data });
        }
        self.notify(collection);
        Ok(id)
    }

    async fn put(&self, collection: &str, id: &str, data: Value) -> Result<(), AppError> {
        {
            let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
            let docs = collections.entry(collection.to_string()).or_default();
            match docs.iter_mut().find(|doc| doc.id == id) {
                Some(doc) => doc.data = data,
                None => docs.push(Document { id: id.to_string(), data }),
            }
        }
        self.notify(collection);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), AppError> {
        {
            let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
                .ok_or_else(|| AppError::not_found(collection, id))?;
            shallow_merge(&mut doc.data, patch);
        }
        self.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        {
            let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
            let docs = collections
                .get_mut(collection)
                .ok_or_else(|| AppError::not_found(collection, id))?;
            let before = docs.len();
            docs.retain(|doc| doc.id != id);
            if docs.len() == before {
                return Err(AppError::not_found(collection, id));
            }
        }
        self.notify(collection);
        Ok(())
    }

    async fn subscribe(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> Result<Subscription, AppError> {
        // Inscreve no feed ANTES do snapshot inicial para não perder mudanças.
        let changes = self.changes.subscribe();
        let initial = self.snapshot(collection, &filters)?;
        let store = self.clone();
        let name = collection.to_string();

        Ok(spawn_feeder(collection.to_string(), initial, changes, move || {
            let snapshot = store.snapshot(&name, &filters);
            async move { snapshot }
        }))
    }
}
