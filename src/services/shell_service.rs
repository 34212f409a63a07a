// src/services/shell_service.rs

use crate::{
    models::{
        auth::{Session, ALL_FERMES},
        ferme::Ferme,
        navigation::NavIcon,
        shell::{
            HeaderView, MenuAction, MenuItem, PresentationView, ProfileView, ShellView, APP_TITLE,
        },
    },
    services::navigation_service::{current_page_label, visible_entries},
};

// Iniciais do avatar quando não há nome nem e-mail
pub const FALLBACK_INITIALS: &str = "U";
pub const ALL_FERMES_LABEL: &str = "Toutes les fermes";

/// Primeira letra de cada palavra (separadas por espaço), em maiúsculas.
/// "Ahmed Ben" → "AB"; nome vazio → "U".
pub fn initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        FALLBACK_INITIALS.to_string()
    } else {
        initials
    }
}

/// Rótulo da ferme de casa: `-` sem ferme, "Toutes les fermes" para a
/// sentinela, o nome quando conhecido, senão o próprio id.
pub fn ferme_label(ferme_id: &str, fermes: &[Ferme]) -> String {
    if ferme_id.is_empty() {
        return "-".to_string();
    }
    if ferme_id == ALL_FERMES {
        return ALL_FERMES_LABEL.to_string();
    }
    fermes
        .iter()
        .find(|f| f.id == ferme_id)
        .map(|f| f.nom.clone())
        .unwrap_or_else(|| ferme_id.to_string())
}

// ---
// Apresentação escolhida pela largura do viewport
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Mobile,
    Desktop,
}

impl Presentation {
    /// Sem largura conhecida, assume desktop.
    pub fn for_width(width: Option<u32>, desktop_breakpoint: u32) -> Self {
        match width {
            Some(w) if w < desktop_breakpoint => Presentation::Mobile,
            _ => Presentation::Desktop,
        }
    }
}

// ---
// Estado local do painel deslizante (mobile)
// ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobilePanel {
    open: bool,
}

impl MobilePanel {
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Selecionar uma entrada navega e fecha o painel.
    pub fn select<'a>(&mut self, route: &'a str) -> &'a str {
        self.open = false;
        route
    }
}

fn settings_item() -> MenuItem {
    MenuItem {
        label: "Paramètres",
        icon: NavIcon::Settings,
        action: MenuAction::Navigate,
        target: "/settings",
    }
}

fn logout_item() -> MenuItem {
    MenuItem {
        label: "Déconnexion",
        icon: NavIcon::LogOut,
        action: MenuAction::Logout,
        target: "/api/auth/logout",
    }
}

pub fn profile(session: &Session) -> ProfileView {
    let display_name = session.identity.display_name().to_string();
    ProfileView {
        initials: initials(&display_name),
        display_name,
        role_label: session.identity.role.label(),
    }
}

/// Monta o "chrome" completo para uma renderização.
pub fn compose(
    session: &Session,
    fermes: &[Ferme],
    stock_count: u32,
    current_path: &str,
    presentation: Presentation,
    panel: MobilePanel,
) -> ShellView {
    let unit_label = session
        .identity
        .ferme_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| ferme_label(id, fermes));

    let header = HeaderView {
        app_title: APP_TITLE,
        page_title: current_page_label(current_path),
        unit_label,
        notification_count: stock_count,
        profile: profile(session),
    };

    let entries = visible_entries(&session.flags, stock_count, current_path);
    let presentation = match presentation {
        Presentation::Mobile => PresentationView::Mobile {
            panel_open: panel.is_open(),
            entries,
            logout: logout_item(),
        },
        Presentation::Desktop => PresentationView::Desktop {
            entries,
            profile_menu: vec![settings_item(), logout_item()],
        },
    };

    ShellView { header, presentation }
}
