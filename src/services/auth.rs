// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Session},
};

// Adaptador do provedor de sessão: valida o JWT emitido pelo provedor de
// autenticação e monta a sessão (identidade + flags de papel).
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    pub async fn session_for_token(&self, token: &str) -> Result<Session, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let identity = self
            .user_repo
            .find_by_id(&token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(Session::new(identity))
    }

    /// Emite um token no mesmo formato do provedor (usado em desenvolvimento e testes).
    pub fn issue_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Logout "fire-and-forget": o token é do provedor; aqui só registramos.
    pub fn logout(&self, session: &Session) {
        tracing::info!(user = %session.identity.id, "Logout");
    }
}
