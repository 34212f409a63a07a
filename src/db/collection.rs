// src/db/collection.rs

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    db::live_query::{decode_snapshot, SharedStore},
    models::{
        ferme::{Ferme, FERMES},
        supervisor::{NewSupervisor, Supervisor, SupervisorChanges, SUPERVISORS},
    },
};

/// Um tipo persistido numa coleção do document store.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// O registro gravado na criação.
    type New: Serialize + Send + Sync;
    /// O registro parcial gravado na edição.
    type Patch: Serialize + Send + Sync;
}

impl Entity for Supervisor {
    const COLLECTION: &'static str = SUPERVISORS;
    type New = NewSupervisor;
    type Patch = SupervisorChanges;
}

impl Entity for Ferme {
    const COLLECTION: &'static str = FERMES;
    type New = Ferme;
    type Patch = Ferme;
}

// O colaborador CRUD de uma coleção. Toda chamada pode falhar (rede, permissão).
#[async_trait]
pub trait CrudCollection<E: Entity>: Send + Sync {
    async fn list(&self) -> Result<Vec<E>, AppError>;
    async fn create(&self, record: &E::New) -> Result<String, AppError>;
    async fn update(&self, id: &str, patch: &E::Patch) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

// Implementação genérica sobre qualquer DocumentStore
pub struct Collection<E> {
    store: SharedStore,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Collection<E> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), _entity: PhantomData }
    }
}

impl<E: Entity> Collection<E> {
    pub fn new(store: SharedStore) -> Self {
        Self { store, _entity: PhantomData }
    }
}

#[async_trait]
impl<E: Entity> CrudCollection<E> for Collection<E> {
    async fn list(&self) -> Result<Vec<E>, AppError> {
        let docs = self.store.list(E::COLLECTION, &[]).await?;
        Ok(decode_snapshot(E::COLLECTION, &docs))
    }

    async fn create(&self, record: &E::New) -> Result<String, AppError> {
        let data = serde_json::to_value(record)?;
        self.store.insert(E::COLLECTION, data).await
    }

    async fn update(&self, id: &str, patch: &E::Patch) -> Result<(), AppError> {
        let data = serde_json::to_value(patch)?;
        self.store.update(E::COLLECTION, id, data).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(E::COLLECTION, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryStore, models::supervisor::SupervisorStatus};
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn supervisor_crud_round_trip() {
        let collection: Collection<Supervisor> = Collection::new(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        let id = collection
            .create(&NewSupervisor {
                nom: "Ahmed Ben".into(),
                telephone: "0612345678".into(),
                company: Some("AGRI".into()),
                statut: SupervisorStatus::Actif,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        collection
            .update(
                &id,
                &SupervisorChanges {
                    nom: "Ahmed Ben".into(),
                    telephone: "0612345678".into(),
                    company: Some("AGRI".into()),
                    statut: SupervisorStatus::Inactif,
                    updated_at: now,
                },
            )
            .await
            .unwrap();

        let all = collection.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].statut, SupervisorStatus::Inactif);
        // createdAt sobrevive ao merge parcial
        assert!(all[0].created_at.is_some());

        collection.delete(&id).await.unwrap();
        assert!(collection.list().await.unwrap().is_empty());
    }
}
