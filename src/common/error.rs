use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso negado: {0}")]
    Forbidden(&'static str),

    #[error("Documento '{id}' não encontrado em '{collection}'")]
    NotFound { collection: String, id: String },

    // A exclusão exige confirmação explícita; carrega o texto da pergunta.
    #[error("Exclusão não confirmada")]
    DeleteNotConfirmed(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    // O store (ou o feed de mudanças) deixou de responder
    #[error("Store indisponível: {0}")]
    StoreUnavailable(String),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        AppError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Mensagem curta para o usuário final, usada nas mensagens transitórias da tela.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(_) => "Données invalides".to_string(),
            AppError::InvalidToken => "Session invalide".to_string(),
            AppError::UserNotFound => "Utilisateur introuvable".to_string(),
            AppError::Forbidden(_) => "Permission refusée".to_string(),
            AppError::NotFound { .. } => "Document introuvable".to_string(),
            AppError::DeleteNotConfirmed(prompt) => prompt.clone(),
            AppError::StoreUnavailable(_) | AppError::DatabaseError(_) => {
                "Service indisponible".to_string()
            }
            _ => "Erreur inconnue".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": crate::models::supervisor::REQUIRED_FIELDS_MESSAGE,
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::DeleteNotConfirmed(prompt) => {
                let body = Json(json!({
                    "error": "Confirmation requise",
                    "confirm": prompt,
                }));
                return (StatusCode::PRECONDITION_REQUIRED, body).into_response();
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Jeton d'authentification invalide ou absent.",
            ),
            AppError::UserNotFound => (StatusCode::UNAUTHORIZED, "Utilisateur introuvable."),
            AppError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                "Vous n'avez pas accès à cette ressource.",
            ),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "Document introuvable."),

            // Todos os outros erros viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Une erreur inattendue s'est produite.",
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_map_to_500_with_generic_message() {
        let error = AppError::StoreUnavailable("feed fechado".into());
        assert_eq!(error.user_message(), "Service indisponible");
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = AppError::from(serde_json::from_str::<u32>("x").unwrap_err());
        assert_eq!(error.user_message(), "Erreur inconnue");
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
