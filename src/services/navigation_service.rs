// src/services/navigation_service.rs

use crate::models::{
    auth::RoleFlags,
    navigation::{NavEntry, NavIcon},
};

// Rótulo usado quando a rota atual não está na lista (detalhes, /settings, ...)
pub const FALLBACK_PAGE_LABEL: &str = "Page";

// De onde vem o badge de uma entrada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    None,
    StockNotifications,
}

pub struct NavDefinition {
    pub label: &'static str,
    pub route: &'static str,
    pub icon: NavIcon,
    pub visible: fn(&RoleFlags) -> bool,
    pub badge: Badge,
}

// --- Predicados de visibilidade ---
fn always(_: &RoleFlags) -> bool {
    true
}

fn sees_fermes(f: &RoleFlags) -> bool {
    f.has_all_farms_access || f.is_user
}

fn sees_ouvriers(f: &RoleFlags) -> bool {
    !f.is_user
}

fn has_any_role(f: &RoleFlags) -> bool {
    f.is_super_admin || f.is_admin || f.is_user
}

fn super_admin_only(f: &RoleFlags) -> bool {
    f.is_super_admin
}

// A lista estática, na ordem de exibição
pub static NAVIGATION: [NavDefinition; 7] = [
    NavDefinition {
        label: "Tableau de bord",
        route: "/",
        icon: NavIcon::Home,
        visible: always,
        badge: Badge::None,
    },
    NavDefinition {
        label: "Fermes",
        route: "/fermes",
        icon: NavIcon::Building2,
        visible: sees_fermes,
        badge: Badge::None,
    },
    NavDefinition {
        label: "Ouvriers",
        route: "/ouvriers",
        icon: NavIcon::Users,
        visible: sees_ouvriers,
        badge: Badge::None,
    },
    NavDefinition {
        label: "Chambres",
        route: "/chambres",
        icon: NavIcon::BedDouble,
        visible: has_any_role,
        badge: Badge::None,
    },
    NavDefinition {
        label: "Stock",
        route: "/stock",
        icon: NavIcon::Package,
        visible: has_any_role,
        badge: Badge::StockNotifications,
    },
    NavDefinition {
        label: "Statistiques",
        route: "/statistiques",
        icon: NavIcon::BarChart3,
        visible: always,
        badge: Badge::None,
    },
    NavDefinition {
        label: "Administration",
        route: "/admin",
        icon: NavIcon::Settings,
        visible: super_admin_only,
        badge: Badge::None,
    },
];

/// Rota ativa: igualdade exata, sem prefixo.
pub fn is_active(route: &str, current_path: &str) -> bool {
    route == current_path
}

/// Entradas visíveis para as flags, na ordem da declaração.
pub fn visible_entries(flags: &RoleFlags, stock_count: u32, current_path: &str) -> Vec<NavEntry> {
    NAVIGATION
        .iter()
        .filter(|def| (def.visible)(flags))
        .map(|def| NavEntry {
            label: def.label,
            route: def.route,
            icon: def.icon,
            notification_count: match def.badge {
                Badge::None => 0,
                Badge::StockNotifications => stock_count,
            },
            active: is_active(def.route, current_path),
        })
        .collect()
}

/// Título da página atual: busca na lista completa (visível ou não).
pub fn current_page_label(current_path: &str) -> &'static str {
    NAVIGATION
        .iter()
        .find(|def| is_active(def.route, current_path))
        .map(|def| def.label)
        .unwrap_or(FALLBACK_PAGE_LABEL)
}
