// src/services/notification_service.rs

//! Agregador de notificações de estoque.
//!
//! Duas assinaturas independentes (alertas não reconhecidos e transferências
//! destinadas à ferme de casa) alimentam uma única task. A cada emissão de
//! qualquer uma delas, os dois últimos snapshots são recombinados pelo redutor
//! puro [`combine`] e o total é publicado num canal `watch`.
//!
//! O valor publicado carrega uma geração: `rescope` incrementa a geração antes
//! de criar as novas assinaturas, e uma task antiga nunca consegue publicar
//! sobre a geração nova (sem contagem dupla). A task antiga e as suas duas
//! assinaturas já foram destruídas quando as novas são criadas.

use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
};

use crate::{
    common::error::AppError,
    db::live_query::{decode_snapshot, Filter, SharedStore, Subscription},
    models::{
        auth::Session,
        stock::{StockAlert, StockTransfer, STOCK_ALERTS, STOCK_TRANSFERS},
    },
};

/// Total de itens acionáveis: alertas não reconhecidos + transferências
/// pendentes/em trânsito destinadas a `unit`.
pub fn combine(alerts: &[StockAlert], transfers: &[StockTransfer], unit: &str) -> u32 {
    let alert_count = alerts.iter().filter(|a| !a.acknowledged).count();
    let transfer_count = transfers
        .iter()
        .filter(|t| t.to_secteur_id == unit && t.status.is_actionable())
        .count();
    u32::try_from(alert_count + transfer_count).unwrap_or(u32::MAX)
}

// ---
// Escopo das consultas
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorScope {
    pub home_unit: String,
    pub all_units: bool,
}

impl AggregatorScope {
    pub fn for_session(session: &Session) -> Self {
        Self {
            home_unit: session.identity.home_unit().to_string(),
            all_units: session.flags.has_all_farms_access,
        }
    }

    // Alertas: sem escopo para quem tem acesso a todas as fermes
    pub fn alert_filters(&self) -> Vec<Filter> {
        let mut filters = vec![Filter::eq("acknowledged", false)];
        if !self.all_units {
            filters.insert(0, Filter::eq("secteurId", self.home_unit.as_str()));
        }
        filters
    }

    // Transferências: sempre limitadas à ferme de casa; o status é filtrado no cliente
    pub fn transfer_filters(&self) -> Vec<Filter> {
        vec![Filter::eq("toSecteurId", self.home_unit.as_str())]
    }
}

/// Contagem pontual, sem assinatura (GET /api/notifications/stock).
pub async fn current_count(store: &SharedStore, scope: &AggregatorScope) -> Result<u32, AppError> {
    let alerts = store.list(STOCK_ALERTS, &scope.alert_filters()).await?;
    let transfers = store.list(STOCK_TRANSFERS, &scope.transfer_filters()).await?;
    Ok(combine(
        &decode_snapshot::<StockAlert>(STOCK_ALERTS, &alerts),
        &decode_snapshot::<StockTransfer>(STOCK_TRANSFERS, &transfers),
        &scope.home_unit,
    ))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Published {
    generation: u64,
    count: u32,
    // Os dois streams já entregaram o primeiro snapshot desta geração
    primed: bool,
}

/// Lado consumidor do agregador.
#[derive(Debug, Clone)]
pub struct CountWatcher {
    receiver: watch::Receiver<Published>,
}

impl CountWatcher {
    pub fn current(&self) -> u32 {
        self.receiver.borrow().count
    }

    /// Primeira contagem real: espera os snapshots iniciais dos dois streams.
    pub async fn ready(&mut self) -> Option<u32> {
        let published = self.receiver.wait_for(|published| published.primed).await.ok()?;
        Some(published.count)
    }

    /// Espera a próxima mudança de contagem. `None` quando o agregador foi destruído.
    pub async fn next(&mut self) -> Option<u32> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().count)
    }
}

// A task em execução e o canal que pede o seu encerramento
struct RunningTask {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct NotificationAggregator {
    store: SharedStore,
    state: watch::Sender<Published>,
    scope: Option<AggregatorScope>,
    task: Option<RunningTask>,
}

impl NotificationAggregator {
    pub fn new(store: SharedStore) -> Self {
        let (state, _) = watch::channel(Published::default());
        Self { store, state, scope: None, task: None }
    }

    /// Cria o agregador já ligado à sessão (ou inativo, sem sessão).
    pub async fn start(store: SharedStore, session: Option<&Session>) -> Result<Self, AppError> {
        let mut aggregator = Self::new(store);
        aggregator.rescope(session).await?;
        Ok(aggregator)
    }

    pub fn count(&self) -> u32 {
        self.state.borrow().count
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    pub fn watch(&self) -> CountWatcher {
        CountWatcher { receiver: self.state.subscribe() }
    }

    /// Troca de identidade/escopo. As duas assinaturas antigas são canceladas
    /// antes da criação das novas; sem sessão o agregador fica inativo com 0.
    pub async fn rescope(&mut self, session: Option<&Session>) -> Result<(), AppError> {
        let scope = session.map(AggregatorScope::for_session);
        if self.is_active() && scope == self.scope {
            return Ok(());
        }

        let generation = self.stop().await;
        let Some(scope) = scope else {
            return Ok(());
        };

        let alerts = self.store.subscribe(STOCK_ALERTS, scope.alert_filters()).await?;
        let transfers = self
            .store
            .subscribe(STOCK_TRANSFERS, scope.transfer_filters())
            .await?;

        tracing::debug!(
            unit = %scope.home_unit,
            all_units = scope.all_units,
            generation,
            "Agregador de notificações ativo"
        );

        let (cancel, cancelled) = oneshot::channel();
        let handle = tokio::spawn(run(
            alerts,
            transfers,
            scope.home_unit.clone(),
            generation,
            self.state.clone(),
            cancelled,
        ));
        self.task = Some(RunningTask { cancel, handle });
        self.scope = Some(scope);
        Ok(())
    }

    /// Encerra a task e espera as duas assinaturas serem liberadas; zera a
    /// contagem e devolve a nova geração.
    pub async fn stop(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            let _ = task.cancel.send(());
            if let Err(e) = task.handle.await {
                tracing::warn!("Task do agregador terminou com erro: {}", e);
            }
        }
        self.scope = None;
        let mut generation = 0;
        self.state.send_modify(|published| {
            published.generation += 1;
            published.count = 0;
            published.primed = false;
            generation = published.generation;
        });
        generation
    }
}

impl Drop for NotificationAggregator {
    fn drop(&mut self) {
        // Sem await aqui: o abort derruba as assinaturas no próximo ponto de escalonamento
        if let Some(task) = self.task.take() {
            task.handle.abort();
        }
    }
}

// A task dona das duas assinaturas. Cada stream é tratado como fonte de
// snapshots completos; um stream encerrado congela no último valor conhecido.
// Nada é publicado antes de os dois lados entregarem o snapshot inicial.
async fn run(
    mut alerts: Subscription,
    mut transfers: Subscription,
    unit: String,
    generation: u64,
    state: watch::Sender<Published>,
    mut cancelled: oneshot::Receiver<()>,
) {
    let mut latest_alerts: Vec<StockAlert> = Vec::new();
    let mut latest_transfers: Vec<StockTransfer> = Vec::new();
    let mut alerts_open = true;
    let mut transfers_open = true;
    let mut alerts_seen = false;
    let mut transfers_seen = false;

    loop {
        tokio::select! {
            _ = &mut cancelled => break,
            snapshot = alerts.next(), if alerts_open => {
                alerts_seen = true;
                match snapshot {
                    Some(docs) => latest_alerts = decode_snapshot(STOCK_ALERTS, &docs),
                    None => {
                        alerts_open = false;
                        tracing::warn!(unit = %unit, "Stream de alertas encerrado; contagem congelada");
                    }
                }
            },
            snapshot = transfers.next(), if transfers_open => {
                transfers_seen = true;
                match snapshot {
                    Some(docs) => latest_transfers = decode_snapshot(STOCK_TRANSFERS, &docs),
                    None => {
                        transfers_open = false;
                        tracing::warn!(unit = %unit, "Stream de transferências encerrado; contagem congelada");
                    }
                }
            },
        }

        if !(alerts_seen && transfers_seen) {
            continue;
        }
        let count = combine(&latest_alerts, &latest_transfers, &unit);
        state.send_if_modified(|published| {
            if published.generation != generation || (published.primed && published.count == count) {
                return false;
            }
            published.count = count;
            published.primed = true;
            true
        });
    }

    alerts.unsubscribe().await;
    transfers.unsubscribe().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        auth::{Identity, Role},
        stock::TransferStatus,
    };

    fn alert(unit: &str, acknowledged: bool) -> StockAlert {
        StockAlert {
            id: String::new(),
            secteur_id: unit.into(),
            acknowledged,
            article: None,
            message: None,
        }
    }

    fn transfer(to: &str, status: TransferStatus) -> StockTransfer {
        StockTransfer {
            id: String::new(),
            from_secteur_id: None,
            to_secteur_id: to.into(),
            status,
            article: None,
        }
    }

    #[test]
    fn combine_counts_unacknowledged_alerts_and_actionable_transfers() {
        let alerts = vec![alert("f1", false), alert("f1", true), alert("f2", false)];
        let transfers = vec![
            transfer("f1", TransferStatus::Pending),
            transfer("f1", TransferStatus::InTransit),
            transfer("f1", TransferStatus::Completed),
            transfer("f1", TransferStatus::Other),
            transfer("f2", TransferStatus::Pending),
        ];
        assert_eq!(combine(&alerts, &transfers, "f1"), 2 + 2);
        assert_eq!(combine(&[], &[], "f1"), 0);
    }

    #[test]
    fn scopes_are_asymmetric_for_all_units_access() {
        let session = Session::new(Identity {
            id: "u".into(),
            nom: None,
            email: "a@b.c".into(),
            role: Role::SuperAdmin,
            ferme_id: Some("f1".into()),
        });
        let scope = AggregatorScope::for_session(&session);
        assert!(scope.all_units);
        assert_eq!(scope.alert_filters(), vec![Filter::eq("acknowledged", false)]);
        assert_eq!(scope.transfer_filters(), vec![Filter::eq("toSecteurId", "f1")]);

        let session = Session::new(Identity { role: Role::Admin, ..session.identity });
        let scope = AggregatorScope::for_session(&session);
        assert_eq!(
            scope.alert_filters(),
            vec![Filter::eq("secteurId", "f1"), Filter::eq("acknowledged", false)]
        );
    }

    #[test]
    fn missing_home_unit_scopes_to_empty_string() {
        let session = Session::new(Identity {
            id: "u".into(),
            nom: None,
            email: "a@b.c".into(),
            role: Role::User,
            ferme_id: None,
        });
        let scope = AggregatorScope::for_session(&session);
        assert_eq!(scope.transfer_filters(), vec![Filter::eq("toSecteurId", "")]);
    }
}
