// src/models/shell.rs

use serde::{Deserialize, Serialize};

use crate::models::navigation::{root_path, NavEntry, NavIcon};

pub const APP_TITLE: &str = "Gestion des Secteurs";

// Query string de GET /api/shell
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellQuery {
    #[serde(default = "root_path")]
    pub path: String,
    // Largura do viewport em px; ausente = desktop
    pub width: Option<u32>,
    #[serde(default)]
    pub menu_open: bool,
}

// --- Perfil (avatar + nome + papel) ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub initials: String,
    pub display_name: String,
    pub role_label: &'static str,
}

// --- Cabeçalho persistente ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderView {
    pub app_title: &'static str,
    pub page_title: &'static str,
    // Só presente quando a identidade tem uma ferme de casa
    pub unit_label: Option<String>,
    pub notification_count: u32,
    pub profile: ProfileView,
}

// Ações do menu de perfil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuAction {
    Navigate,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub label: &'static str,
    pub icon: NavIcon,
    pub action: MenuAction,
    pub target: &'static str,
}

// --- As duas apresentações mutuamente exclusivas ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PresentationView {
    // Painel deslizante: menu completo + perfil + logout
    #[serde(rename_all = "camelCase")]
    Mobile {
        panel_open: bool,
        entries: Vec<NavEntry>,
        logout: MenuItem,
    },
    // Barra superior com as entradas em linha + menu de perfil
    #[serde(rename_all = "camelCase")]
    Desktop {
        entries: Vec<NavEntry>,
        profile_menu: Vec<MenuItem>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellView {
    pub header: HeaderView,
    pub presentation: PresentationView,
}
