// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{RoleFlags, Session},
};

/// 1. O Trait que define uma capacidade derivada das flags de papel
pub trait CapabilityDef: Send + Sync + 'static {
    fn name() -> &'static str;
    fn granted(flags: &RoleFlags) -> bool;
}

/// 2. O Extractor (Guardião)
pub struct RequireCapability<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A sessão é colocada pelo auth_guard
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AppError::InvalidToken)?;

        if !T::granted(&session.flags) {
            tracing::warn!(
                user = %session.identity.id,
                capability = T::name(),
                "Acesso negado"
            );
            return Err(AppError::Forbidden(T::name()));
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

// Administração: mesma regra da entrada de navegação "Administration"
pub struct CapAdministration;
impl CapabilityDef for CapAdministration {
    fn name() -> &'static str { "administration" }
    fn granted(flags: &RoleFlags) -> bool { flags.is_super_admin }
}
