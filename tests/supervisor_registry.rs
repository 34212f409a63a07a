// tests/supervisor_registry.rs

use async_trait::async_trait;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use secteurs_admin::{
    common::error::AppError,
    db::CrudCollection,
    models::supervisor::{
        NewSupervisor, Supervisor, SupervisorChanges, SupervisorInput, SupervisorStatus,
        REQUIRED_FIELDS_MESSAGE,
    },
    services::supervisor_service::{
        DeleteOutcome, FormMode, SubmitOutcome, SupervisorRegistry, SupervisorService,
        MSG_CREATED, MSG_DELETED, MSG_UPDATED,
    },
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    List,
    Create(NewSupervisor),
    Update(String, SupervisorChanges),
    Delete(String),
}

// Colaborador CRUD falso que grava cada chamada
#[derive(Default)]
struct RecordingCollection {
    calls: Mutex<Vec<Call>>,
    supervisors: Vec<Supervisor>,
    fail: AtomicBool,
    // As escritas nunca terminam (rede pendurada)
    hang: AtomicBool,
}

impl RecordingCollection {
    fn with(supervisors: Vec<Supervisor>) -> Self {
        Self { supervisors, ..Default::default() }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("permission refusée".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CrudCollection<Supervisor> for RecordingCollection {
    async fn list(&self) -> Result<Vec<Supervisor>, AppError> {
        self.record(Call::List)?;
        Ok(self.supervisors.clone())
    }

    async fn create(&self, record: &NewSupervisor) -> Result<String, AppError> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.record(Call::Create(record.clone()))?;
        Ok("s-new".into())
    }

    async fn update(&self, id: &str, patch: &SupervisorChanges) -> Result<(), AppError> {
        self.record(Call::Update(id.into(), patch.clone()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.record(Call::Delete(id.into()))
    }
}

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

#[tokio::test]
async fn missing_required_fields_never_reach_the_collaborator() {
    let collection = RecordingCollection::default();
    let mut registry = SupervisorRegistry::new();
    registry.open_create();
    registry.set_nom("Ahmed");

    assert_eq!(registry.submit(&collection).await, SubmitOutcome::Invalid);
    assert_eq!(registry.error(), Some(REQUIRED_FIELDS_MESSAGE));
    assert!(registry.is_dialog_open());
    assert!(collection.calls().is_empty());
}

#[tokio::test]
async fn create_sends_one_record_and_resets_the_form() {
    let collection = RecordingCollection::default();
    let mut registry = SupervisorRegistry::new();
    registry.open_create();
    registry.set_nom("Ahmed Ben");
    registry.set_telephone("0612345678");
    registry.set_company("");
    registry.set_statut(SupervisorStatus::Inactif);

    let outcome = registry.submit(&collection).await;
    assert_eq!(outcome, SubmitOutcome::Created { id: "s-new".into() });

    let calls = collection.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Create(record) => {
            assert_eq!(record.nom, "Ahmed Ben");
            assert_eq!(record.company, None);
            assert_eq!(record.statut, SupervisorStatus::Inactif);
            assert_eq!(record.created_at, record.updated_at);
        }
        other => panic!("chamada inesperada: {:?}", other),
    }

    assert!(!registry.is_dialog_open());
    assert_eq!(registry.mode(), &FormMode::Creating);
    assert_eq!(registry.values(), &SupervisorInput::default());
    assert_eq!(registry.message(), Some(MSG_CREATED));
}

#[tokio::test]
async fn edit_updates_the_existing_record() {
    let collection = RecordingCollection::default();
    let mut registry = SupervisorRegistry::new();
    registry.open_edit(&ahmed());
    registry.set_statut(SupervisorStatus::Inactif);

    assert_eq!(registry.submit(&collection).await, SubmitOutcome::Updated);
    match collection.calls().as_slice() {
        [Call::Update(id, changes)] => {
            assert_eq!(id, "s1");
            assert_eq!(changes.statut, SupervisorStatus::Inactif);
            assert_eq!(changes.nom, "Ahmed Ben");
            assert_eq!(changes.company.as_deref(), Some("AGRI"));
        }
        other => panic!("chamadas inesperadas: {:?}", other),
    }
    assert!(!registry.is_dialog_open());
    assert_eq!(registry.message(), Some(MSG_UPDATED));
}

#[tokio::test]
async fn abandoned_save_does_not_leave_the_form_loading() {
    let collection = RecordingCollection::default();
    collection.hang.store(true, Ordering::SeqCst);
    let mut registry = SupervisorRegistry::new();
    registry.open_create();
    registry.set_nom("Ahmed Ben");
    registry.set_telephone("0612345678");

    let abandoned = tokio::time::timeout(Duration::from_millis(20), registry.submit(&collection)).await;
    assert!(abandoned.is_err());
    assert!(!registry.is_loading());
    assert!(registry.view(&[]).dialog.unwrap().submit_enabled);

    collection.hang.store(false, Ordering::SeqCst);
    assert_eq!(
        registry.submit(&collection).await,
        SubmitOutcome::Created { id: "s-new".into() }
    );
    assert_eq!(collection.calls().len(), 1);
}

#[tokio::test]
async fn failed_save_keeps_the_dialog_and_values() {
    let collection = RecordingCollection::default();
    collection.fail.store(true, Ordering::SeqCst);
    let mut registry = SupervisorRegistry::new();
    registry.open_edit(&ahmed());

    assert_eq!(registry.submit(&collection).await, SubmitOutcome::Failed);
    assert!(registry.is_dialog_open());
    assert!(!registry.is_loading());
    assert_eq!(registry.values().nom, "Ahmed Ben");
    assert_eq!(
        registry.error(),
        Some("Erreur lors de la gestion du superviseur: Service indisponible")
    );
    assert_eq!(registry.mode(), &FormMode::Editing { id: "s1".into() });
}

#[tokio::test]
async fn delete_requires_confirmation_and_issues_one_call() {
    let collection = RecordingCollection::default();
    let mut registry = SupervisorRegistry::new();

    let prompt = registry.request_delete(&ahmed());
    assert_eq!(
        registry.resolve_delete(prompt.clone(), false, &collection).await,
        DeleteOutcome::Cancelled
    );
    assert!(collection.calls().is_empty());

    assert_eq!(
        registry.resolve_delete(prompt, true, &collection).await,
        DeleteOutcome::Deleted
    );
    assert_eq!(collection.calls(), vec![Call::Delete("s1".into())]);
    assert_eq!(registry.message(), Some(MSG_DELETED));
}

#[tokio::test]
async fn failed_delete_surfaces_an_error() {
    let collection = RecordingCollection::default();
    collection.fail.store(true, Ordering::SeqCst);
    let mut registry = SupervisorRegistry::new();

    let prompt = registry.request_delete(&ahmed());
    assert_eq!(
        registry.resolve_delete(prompt, true, &collection).await,
        DeleteOutcome::Failed
    );
    assert_eq!(registry.error(), Some("Erreur lors de la suppression: Service indisponible"));

    // A lista continua vindo do provedor, inalterada
    let view = registry.view(&[ahmed()]);
    assert_eq!(view.rows.len(), 1);
}

#[tokio::test]
async fn service_delete_without_confirmation_issues_no_delete() {
    let collection = Arc::new(RecordingCollection::with(vec![ahmed()]));
    let service = SupervisorService::new(collection.clone());

    match service.delete("s1", false).await {
        Err(AppError::DeleteNotConfirmed(question)) => {
            assert!(question.contains("\"Ahmed Ben\""));
        }
        other => panic!("resultado inesperado: {:?}", other),
    }
    assert_eq!(collection.calls(), vec![Call::List]);

    service.delete("s1", true).await.unwrap();
    assert_eq!(collection.calls(), vec![Call::List, Call::Delete("s1".into())]);
}

#[tokio::test]
async fn service_rejects_blank_fields_before_writing() {
    let collection = Arc::new(RecordingCollection::default());
    let service = SupervisorService::new(collection.clone());

    let input = SupervisorInput {
        nom: "Ahmed".into(),
        telephone: "   ".into(),
        ..Default::default()
    };
    assert!(matches!(
        service.create(input).await,
        Err(AppError::ValidationError(_))
    ));
    assert!(collection.calls().is_empty());
}
