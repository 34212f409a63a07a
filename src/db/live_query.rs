// src/db/live_query.rs

//! Contrato do document store "realtime".
//!
//! Toda consulta devolve o conjunto completo de documentos que casam com os
//! filtros. Uma [`Subscription`] entrega primeiro o snapshot atual e depois um
//! snapshot completo a cada mudança da coleção: nunca um delta.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{future::Future, sync::Arc};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};

use crate::common::error::AppError;

// Capacidade do canal de snapshots de cada assinatura
pub(crate) const SNAPSHOT_BUFFER: usize = 16;

// ---
// Filtros (igualdade / desigualdade sobre um campo de primeiro nível)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self { field: field.to_string(), op: FilterOp::Eq, value: value.into() }
    }

    pub fn ne(field: &str, value: impl Into<Value>) -> Self {
        Self { field: field.to_string(), op: FilterOp::Ne, value: value.into() }
    }

    /// Avalia o filtro contra os dados de um documento.
    /// `Ne` exige que o campo exista (mesma semântica do store remoto).
    pub fn matches(&self, data: &Value) -> bool {
        match (self.op, data.get(&self.field)) {
            (FilterOp::Eq, Some(v)) => *v == self.value,
            (FilterOp::Ne, Some(v)) => *v != self.value,
            (_, None) => false,
        }
    }
}

pub fn matches_all(filters: &[Filter], data: &Value) -> bool {
    filters.iter().all(|f| f.matches(data))
}

// ---
// Documento
// ---
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Converte para o modelo tipado, injetando o `id` no objeto.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut data = self.data.clone();
        if let Value::Object(map) = &mut data {
            map.insert("id".to_string(), Value::String(self.id.clone()));
        }
        serde_json::from_value(data)
    }
}

/// Decodifica um snapshot inteiro, descartando (e logando) documentos malformados.
pub fn decode_snapshot<T: DeserializeOwned>(collection: &str, docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(collection, id = %doc.id, "Documento ignorado: {}", e);
                None
            }
        })
        .collect()
}

// ---
// Assinatura
// ---
// Dona do listener: `unsubscribe()` ou o `Drop` liberam a task de alimentação.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<Vec<Document>>,
    feeder: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(receiver: mpsc::Receiver<Vec<Document>>, feeder: JoinHandle<()>) -> Self {
        Self { receiver, feeder: Some(feeder) }
    }

    /// Próximo snapshot completo. `None` quando o stream foi encerrado
    /// (erro de rede, permissão, ou `unsubscribe`).
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        self.receiver.recv().await
    }

    /// Encerra a assinatura e só retorna quando a task de alimentação
    /// (e o que ela segura) já foi destruída.
    pub async fn unsubscribe(mut self) {
        self.receiver.close();
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
            let _ = feeder.await;
        }
    }

    fn release(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
        self.receiver.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

// ---
// Feed de mudanças compartilhado pelos stores
// ---
// Um único feed por store; cada assinatura só reconsulta a sua coleção.
#[derive(Debug, Clone)]
pub(crate) enum Change {
    Updated(String),
    // Mudanças podem ter sido perdidas (reconexão): todos reconsultam
    Resync,
    // Encerra as assinaturas de uma coleção (perda do stream)
    Disconnected(String),
}

/// Cria a task de alimentação de uma assinatura: envia o snapshot inicial e
/// um snapshot novo (via `refetch`) a cada mudança relevante do feed.
pub(crate) fn spawn_feeder<F, Fut>(
    collection: String,
    initial: Vec<Document>,
    mut changes: broadcast::Receiver<Change>,
    refetch: F,
) -> Subscription
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<Document>, AppError>> + Send,
{
    let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);

    let feeder = tokio::spawn(async move {
        if tx.send(initial).await.is_err() {
            return;
        }
        loop {
            match changes.recv().await {
                Ok(Change::Updated(name)) if name == collection => {}
                Ok(Change::Resync) => {}
                Ok(Change::Disconnected(name)) if name == collection => {
                    tracing::debug!(collection = %collection, "Stream desconectado");
                    return;
                }
                Ok(_) => continue,
                // Perdemos eventos: um snapshot novo cobre todos eles.
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return,
            }
            let snapshot = match refetch().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(collection = %collection, "Falha no snapshot: {}", e);
                    return;
                }
            };
            if tx.send(snapshot).await.is_err() {
                return;
            }
        }
    });

    Subscription::new(rx, feeder)
}

// ---
// O trait do store
// ---
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, AppError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError>;

    /// Cria um documento com id gerado pelo store.
    async fn insert(&self, collection: &str, data: Value) -> Result<String, AppError>;

    /// Cria ou substitui um documento com id conhecido.
    async fn put(&self, collection: &str, id: &str, data: Value) -> Result<(), AppError>;

    /// Merge raso do `patch` sobre o documento existente.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), AppError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError>;

    async fn subscribe(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> Result<Subscription, AppError>;
}

pub type SharedStore = Arc<dyn DocumentStore>;

/// Merge raso de objetos JSON (usado pelo store em memória).
pub(crate) fn shallow_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}
