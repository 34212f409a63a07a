// src/models/auth.rs

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// Sentinela usada pelo provedor de autenticação para "todas as fermes"
pub const ALL_FERMES: &str = "all";

// ---
// 1. Papel (Role)
// ---
// Enumeração fechada: um papel desconhecido falha na construção
// (desserialização ou `FromStr`), nunca vira um fallback em tempo de execução.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    SuperAdmin,
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "superadmin",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Rótulo exibido no menu de perfil.
    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Administrateur",
            Role::Admin => "Administrateur",
            Role::User => "Utilisateur",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Papel desconhecido: '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

// ---
// 2. Identidade (o documento da coleção `users`)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub id: String,
    pub nom: Option<String>,
    pub email: String,
    pub role: Role,
    pub ferme_id: Option<String>,
}

impl Identity {
    /// Nome exibido no cabeçalho: o nome, ou o e-mail se o nome estiver vazio.
    pub fn display_name(&self) -> &str {
        match self.nom.as_deref() {
            Some(nom) if !nom.trim().is_empty() => nom,
            _ => &self.email,
        }
    }

    /// Unidade "de casa" usada nos filtros (string vazia quando ausente).
    pub fn home_unit(&self) -> &str {
        self.ferme_id.as_deref().unwrap_or("")
    }
}

// ---
// 3. Flags de papel (capacidades grosseiras)
// ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleFlags {
    pub is_super_admin: bool,
    pub is_admin: bool,
    pub is_user: bool,
    pub has_all_farms_access: bool,
}

impl RoleFlags {
    pub fn for_identity(identity: &Identity) -> Self {
        let is_super_admin = identity.role == Role::SuperAdmin;
        Self {
            is_super_admin,
            is_admin: identity.role == Role::Admin,
            is_user: identity.role == Role::User,
            has_all_farms_access: is_super_admin
                || identity.ferme_id.as_deref() == Some(ALL_FERMES),
        }
    }
}

// ---
// 4. Sessão
// ---
// Construída explicitamente pelo guardião de autenticação e injetada nos handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identity: Identity,
    pub flags: RoleFlags,
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        let flags = RoleFlags::for_identity(&identity);
        Self { identity, flags }
    }
}

// Resposta de /api/users/me
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub identity: Identity,
    pub role_label: &'static str,
    pub flags: RoleFlags,
}

// Resposta do logout
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub redirect_to: &'static str,
}

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (ID do usuário)
    pub exp: usize,  // Expiration time (quando o token expira)
    pub iat: usize,  // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role, ferme_id: Option<&str>) -> Identity {
        Identity {
            id: "u1".into(),
            nom: Some("Ahmed Ben".into()),
            email: "ahmed@secteurs.test".into(),
            role,
            ferme_id: ferme_id.map(str::to_string),
        }
    }

    #[test]
    fn role_labels_are_total() {
        assert_eq!(Role::SuperAdmin.label(), "Super Administrateur");
        assert_eq!(Role::Admin.label(), "Administrateur");
        assert_eq!(Role::User.label(), "Utilisateur");
    }

    #[test]
    fn unknown_role_is_rejected_at_construction() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("manager".parse::<Role>().is_err());

        let raw = serde_json::json!({ "email": "x@y.z", "role": "manager" });
        assert!(serde_json::from_value::<Identity>(raw).is_err());
    }

    #[test]
    fn all_farms_access_for_super_admin_or_sentinel_unit() {
        assert!(RoleFlags::for_identity(&identity(Role::SuperAdmin, Some("f1"))).has_all_farms_access);
        assert!(RoleFlags::for_identity(&identity(Role::Admin, Some(ALL_FERMES))).has_all_farms_access);
        assert!(!RoleFlags::for_identity(&identity(Role::Admin, Some("f1"))).has_all_farms_access);
        assert!(!RoleFlags::for_identity(&identity(Role::User, None)).has_all_farms_access);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut id = identity(Role::User, None);
        assert_eq!(id.display_name(), "Ahmed Ben");
        id.nom = Some("  ".into());
        assert_eq!(id.display_name(), "ahmed@secteurs.test");
        id.nom = None;
        assert_eq!(id.display_name(), "ahmed@secteurs.test");
    }
}
