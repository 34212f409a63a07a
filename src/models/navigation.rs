// src/models/navigation.rs

use serde::{Deserialize, Serialize};

// Símbolos de ícone conhecidos pelo cliente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavIcon {
    Home,
    Building2,
    Users,
    BedDouble,
    Package,
    BarChart3,
    Settings,
    LogOut,
}

// Uma entrada de navegação já avaliada para a sessão atual
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavEntry {
    pub label: &'static str,
    pub route: &'static str,
    pub icon: NavIcon,
    pub notification_count: u32,
    pub active: bool,
}

// Query string de GET /api/navigation
#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    #[serde(default = "root_path")]
    pub path: String,
}

pub(crate) fn root_path() -> String {
    "/".to_string()
}
