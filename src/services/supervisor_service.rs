// src/services/supervisor_service.rs

use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::CrudCollection,
    models::supervisor::{
        DialogView, EmptyState, RegistryView, Supervisor, SupervisorInput, SupervisorRow,
        SupervisorStatus, REQUIRED_FIELDS_MESSAGE,
    },
};

pub const MSG_CREATED: &str = "Superviseur ajouté avec succès";
pub const MSG_UPDATED: &str = "Superviseur mis à jour avec succès";
pub const MSG_DELETED: &str = "Superviseur supprimé avec succès";

pub type SupervisorCollection = Arc<dyn CrudCollection<Supervisor>>;

/// Texto da confirmação exigida antes de excluir.
pub fn delete_question(nom: &str) -> String {
    format!("Êtes-vous sûr de vouloir supprimer le superviseur \"{}\" ?", nom)
}

// ---
// Serviço usado pelos handlers HTTP
// ---
#[derive(Clone)]
pub struct SupervisorService {
    collection: SupervisorCollection,
}

impl SupervisorService {
    pub fn new(collection: SupervisorCollection) -> Self {
        Self { collection }
    }

    // Ordem do provedor: sem ordenação nem filtro no cliente
    pub async fn list(&self) -> Result<Vec<Supervisor>, AppError> {
        self.collection.list().await
    }

    pub async fn create(&self, input: SupervisorInput) -> Result<String, AppError> {
        input.validate()?;
        let id = self
            .collection
            .create(&input.into_new(Utc::now()))
            .await
            .inspect_err(|e| tracing::error!("Falha ao criar supervisor: {}", e))?;
        tracing::info!(id = %id, "Supervisor criado");
        Ok(id)
    }

    pub async fn update(&self, id: &str, input: SupervisorInput) -> Result<(), AppError> {
        input.validate()?;
        self.collection
            .update(id, &input.into_changes(Utc::now()))
            .await
            .inspect_err(|e| tracing::error!(id, "Falha ao atualizar supervisor: {}", e))?;
        tracing::info!(id, "Supervisor atualizado");
        Ok(())
    }

    /// Sem confirmação nenhuma chamada de exclusão é feita: devolve a pergunta.
    pub async fn delete(&self, id: &str, confirmed: bool) -> Result<(), AppError> {
        if !confirmed {
            let supervisors = self.collection.list().await?;
            let target = supervisors
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| AppError::not_found(crate::models::supervisor::SUPERVISORS, id))?;
            return Err(AppError::DeleteNotConfirmed(delete_question(&target.nom)));
        }
        self.collection
            .delete(id)
            .await
            .inspect_err(|e| tracing::error!(id, "Falha ao excluir supervisor: {}", e))?;
        tracing::info!(id, "Supervisor excluído");
        Ok(())
    }
}

// ---
// Estado da tela de gestão (lista + diálogo + formulário)
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Creating,
    Editing { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    // Validação local falhou; nada foi enviado
    Invalid,
    Created { id: String },
    Updated,
    // O colaborador falhou; o diálogo continua aberto com os valores
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed,
}

/// Pergunta de confirmação pendente. Só `SupervisorRegistry::resolve_delete`
/// a consome; sem confirmação nenhuma chamada é feita.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: String,
    pub question: String,
}

// Marca `loading` enquanto vive; volta a `false` mesmo se o future for descartado
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[derive(Debug, Clone)]
pub struct SupervisorRegistry {
    mode: FormMode,
    values: SupervisorInput,
    dialog_open: bool,
    loading: bool,
    error: Option<String>,
    message: Option<String>,
}

impl Default for SupervisorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisorRegistry {
    pub fn new() -> Self {
        Self {
            mode: FormMode::Creating,
            values: SupervisorInput::default(),
            dialog_open: false,
            loading: false,
            error: None,
            message: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn values(&self) -> &SupervisorInput {
        &self.values
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn reset_form(&mut self) {
        self.mode = FormMode::Creating;
        self.values = SupervisorInput::default();
        self.error = None;
        self.message = None;
    }

    pub fn open_create(&mut self) {
        self.reset_form();
        self.dialog_open = true;
    }

    pub fn open_edit(&mut self, supervisor: &Supervisor) {
        self.reset_form();
        self.values = SupervisorInput::from(supervisor);
        self.mode = FormMode::Editing { id: supervisor.id.clone() };
        self.dialog_open = true;
    }

    /// Fechar o diálogo descarta o formulário.
    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
        self.reset_form();
    }

    pub fn set_nom(&mut self, nom: impl Into<String>) {
        self.values.nom = nom.into();
    }

    pub fn set_telephone(&mut self, telephone: impl Into<String>) {
        self.values.telephone = telephone.into();
    }

    pub fn set_company(&mut self, company: impl Into<String>) {
        self.values.company = Some(company.into());
    }

    pub fn set_statut(&mut self, statut: SupervisorStatus) {
        self.values.statut = statut;
    }

    /// Valida e grava. `&mut self` impede dois salvamentos simultâneos.
    pub async fn submit(&mut self, collection: &dyn CrudCollection<Supervisor>) -> SubmitOutcome {
        self.error = None;
        self.message = None;

        if self.values.validate().is_err() {
            self.error = Some(REQUIRED_FIELDS_MESSAGE.to_string());
            return SubmitOutcome::Invalid;
        }

        let now = Utc::now();
        let values = self.values.clone();
        let result = {
            let _loading = LoadingGuard::new(&mut self.loading);
            match &self.mode {
                FormMode::Editing { id } => collection
                    .update(id, &values.into_changes(now))
                    .await
                    .map(|()| (SubmitOutcome::Updated, MSG_UPDATED)),
                FormMode::Creating => collection
                    .create(&values.into_new(now))
                    .await
                    .map(|id| (SubmitOutcome::Created { id }, MSG_CREATED)),
            }
        };

        match result {
            Ok((outcome, message)) => {
                self.reset_form();
                self.dialog_open = false;
                self.message = Some(message.to_string());
                outcome
            }
            Err(e) => {
                tracing::error!("Erro ao gerir supervisor: {}", e);
                self.error = Some(format!(
                    "Erreur lors de la gestion du superviseur: {}",
                    e.user_message()
                ));
                SubmitOutcome::Failed
            }
        }
    }

    pub fn request_delete(&self, supervisor: &Supervisor) -> DeletePrompt {
        DeletePrompt {
            id: supervisor.id.clone(),
            question: delete_question(&supervisor.nom),
        }
    }

    /// Resolve a pergunta: só `confirmed == true` emite a exclusão (uma vez).
    /// A lista não é alterada aqui; ela vem do próximo snapshot do provedor.
    pub async fn resolve_delete(
        &mut self,
        prompt: DeletePrompt,
        confirmed: bool,
        collection: &dyn CrudCollection<Supervisor>,
    ) -> DeleteOutcome {
        if !confirmed {
            return DeleteOutcome::Cancelled;
        }

        let result = {
            let _loading = LoadingGuard::new(&mut self.loading);
            collection.delete(&prompt.id).await
        };

        match result {
            Ok(()) => {
                self.message = Some(MSG_DELETED.to_string());
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::error!(id = %prompt.id, "Erro ao excluir supervisor: {}", e);
                self.error = Some(format!("Erreur lors de la suppression: {}", e.user_message()));
                DeleteOutcome::Failed
            }
        }
    }

    /// Visão da tela para a lista atual do provedor.
    pub fn view(&self, supervisors: &[Supervisor]) -> RegistryView {
        let rows: Vec<SupervisorRow> = supervisors.iter().map(SupervisorRow::from).collect();
        let empty_state = rows.is_empty().then_some(EmptyState {
            title: "Aucun superviseur",
            body: "Commencez par ajouter votre premier superviseur.",
        });

        let editing = matches!(self.mode, FormMode::Editing { .. });
        let dialog = self.dialog_open.then(|| DialogView {
            title: if editing { "Modifier le superviseur" } else { "Ajouter un nouveau superviseur" },
            description: if editing {
                "Modifiez les informations du superviseur"
            } else {
                "Remplissez les informations du nouveau superviseur"
            },
            submit_label: match (self.loading, editing) {
                (true, _) => "Enregistrement...",
                (false, true) => "Modifier",
                (false, false) => "Ajouter",
            },
            submit_enabled: !self.loading,
            values: self.values.clone(),
            error: self.error.clone(),
            message: self.message.clone(),
        });

        RegistryView {
            title: "Gestion des Superviseurs",
            rows,
            empty_state,
            dialog,
            error: self.error.clone(),
            message: self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ahmed() -> Supervisor {
        Supervisor {
            id: "s1".into(),
            nom: "Ahmed Ben".into(),
            telephone: "0612345678".into(),
            company: Some("AGRI".into()),
            statut: SupervisorStatus::Actif,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn open_edit_populates_the_form() {
        let mut registry = SupervisorRegistry::new();
        registry.open_edit(&ahmed());
        assert!(registry.is_dialog_open());
        assert_eq!(registry.mode(), &FormMode::Editing { id: "s1".into() });
        assert_eq!(registry.values().nom, "Ahmed Ben");

        let view = registry.view(&[ahmed()]);
        let dialog = view.dialog.unwrap();
        assert_eq!(dialog.title, "Modifier le superviseur");
        assert_eq!(dialog.submit_label, "Modifier");
    }

    #[test]
    fn closing_the_dialog_resets_the_form() {
        let mut registry = SupervisorRegistry::new();
        registry.open_edit(&ahmed());
        registry.close_dialog();
        assert!(!registry.is_dialog_open());
        assert_eq!(registry.mode(), &FormMode::Creating);
        assert_eq!(registry.values(), &SupervisorInput::default());
    }

    #[test]
    fn empty_list_shows_empty_state() {
        let view = SupervisorRegistry::new().view(&[]);
        assert_eq!(view.empty_state.unwrap().title, "Aucun superviseur");
        assert!(view.dialog.is_none());
    }

    #[test]
    fn delete_prompt_names_the_supervisor() {
        let prompt = SupervisorRegistry::new().request_delete(&ahmed());
        assert_eq!(prompt.id, "s1");
        assert_eq!(
            prompt.question,
            "Êtes-vous sûr de vouloir supprimer le superviseur \"Ahmed Ben\" ?"
        );
    }
}
