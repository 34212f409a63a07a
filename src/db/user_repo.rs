use crate::{
    common::error::AppError,
    db::live_query::SharedStore,
    models::auth::Identity,
};

pub const USERS: &str = "users";

// O repositório de usuários, responsável pela leitura da coleção 'users'.
// As identidades são criadas/removidas pelo provedor de autenticação.
#[derive(Clone)]
pub struct UserRepository {
    store: SharedStore,
}

impl UserRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, AppError> {
        let Some(doc) = self.store.get(USERS, id).await? else {
            return Ok(None);
        };
        // Um papel desconhecido é erro de construção, não um fallback
        let identity = doc.decode::<Identity>().map_err(|e| {
            tracing::warn!(id, "Identidade inválida: {}", e);
            AppError::UserNotFound
        })?;
        Ok(Some(identity))
    }
}
