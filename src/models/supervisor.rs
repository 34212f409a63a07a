// src/models/supervisor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const SUPERVISORS: &str = "supervisors";

// Mensagem única exibida quando falta um campo obrigatório
pub const REQUIRED_FIELDS_MESSAGE: &str = "Veuillez remplir tous les champs obligatoires";

// --- Enums ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisorStatus {
    #[default]
    Actif,
    Inactif,
}

impl SupervisorStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SupervisorStatus::Actif => "Actif",
            SupervisorStatus::Inactif => "Inactif",
        }
    }
}

// --- Supervisor (o que sai do store) ---
// Global: não pertence a nenhuma ferme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supervisor {
    #[serde(default)]
    pub id: String,
    pub nom: String,
    pub telephone: String,
    pub company: Option<String>,
    pub statut: SupervisorStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---
// Validação Customizada
// ---
fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(REQUIRED_FIELDS_MESSAGE.into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: o "formulário" do supervisor (criação e edição)
// ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorInput {
    #[validate(custom(function = "validate_required"))]
    #[serde(default)]
    pub nom: String,

    #[validate(custom(function = "validate_required"))]
    #[serde(default)]
    pub telephone: String,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub statut: SupervisorStatus,
}

impl SupervisorInput {
    /// Empresa normalizada: string vazia vira `None`.
    fn company(&self) -> Option<String> {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }

    pub fn into_new(self, now: DateTime<Utc>) -> NewSupervisor {
        NewSupervisor {
            company: self.company(),
            nom: self.nom,
            telephone: self.telephone,
            statut: self.statut,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_changes(self, now: DateTime<Utc>) -> SupervisorChanges {
        SupervisorChanges {
            company: self.company(),
            nom: self.nom,
            telephone: self.telephone,
            statut: self.statut,
            updated_at: now,
        }
    }
}

impl From<&Supervisor> for SupervisorInput {
    fn from(s: &Supervisor) -> Self {
        Self {
            nom: s.nom.clone(),
            telephone: s.telephone.clone(),
            company: s.company.clone(),
            statut: s.statut,
        }
    }
}

// O registro gravado na criação
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupervisor {
    pub nom: String,
    pub telephone: String,
    pub company: Option<String>,
    pub statut: SupervisorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O registro parcial gravado na edição (createdAt é preservado)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorChanges {
    pub nom: String,
    pub telephone: String,
    pub company: Option<String>,
    pub statut: SupervisorStatus,
    pub updated_at: DateTime<Utc>,
}

// --- Respostas e query strings da API ---
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorCreated {
    pub id: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SupervisorMessage {
    pub message: &'static str,
}

// DELETE /api/supervisors/{id}?confirm=true
#[derive(Debug, Default, Deserialize)]
pub struct DeleteSupervisorQuery {
    #[serde(default)]
    pub confirm: bool,
}

// --- Linha da tabela de supervisores ---
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Green,
    Red,
}

impl From<SupervisorStatus> for StatusBadge {
    fn from(statut: SupervisorStatus) -> Self {
        let tone = match statut {
            SupervisorStatus::Actif => BadgeTone::Green,
            SupervisorStatus::Inactif => BadgeTone::Red,
        };
        Self { label: statut.label(), tone }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorRow {
    pub id: String,
    pub nom: String,
    pub company: String,
    pub telephone: String,
    pub badge: StatusBadge,
}

impl From<&Supervisor> for SupervisorRow {
    fn from(s: &Supervisor) -> Self {
        Self {
            id: s.id.clone(),
            nom: s.nom.clone(),
            company: s
                .company
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "-".to_string()),
            telephone: s.telephone.clone(),
            badge: s.statut.into(),
        }
    }
}

// --- Visão da tela de gestão ---
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyState {
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogView {
    pub title: &'static str,
    pub description: &'static str,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub values: SupervisorInput,
    pub error: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryView {
    pub title: &'static str,
    pub rows: Vec<SupervisorRow>,
    pub empty_state: Option<EmptyState>,
    pub dialog: Option<DialogView>,
    pub error: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_or_phone_fails_validation() {
        let input = SupervisorInput {
            nom: "   ".into(),
            telephone: "0612345678".into(),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nom"));

        let input = SupervisorInput {
            nom: "Ahmed".into(),
            telephone: String::new(),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("telephone"));
    }

    #[test]
    fn empty_company_is_stored_as_absent() {
        let input = SupervisorInput {
            nom: "Ahmed".into(),
            telephone: "0612345678".into(),
            company: Some("  ".into()),
            statut: SupervisorStatus::Actif,
        };
        let record = input.into_new(Utc::now());
        assert_eq!(record.company, None);
    }

    #[test]
    fn row_shows_dash_for_missing_company_and_colored_badge() {
        let s = Supervisor {
            id: "s1".into(),
            nom: "Ahmed".into(),
            telephone: "06".into(),
            company: None,
            statut: SupervisorStatus::Inactif,
            created_at: None,
            updated_at: None,
        };
        let row = SupervisorRow::from(&s);
        assert_eq!(row.company, "-");
        assert_eq!(row.badge.label, "Inactif");
        assert_eq!(row.badge.tone, BadgeTone::Red);
    }

    #[test]
    fn status_serializes_in_french() {
        assert_eq!(
            serde_json::to_value(SupervisorStatus::Inactif).unwrap(),
            serde_json::json!("inactif")
        );
    }
}
