// src/models/stock.rs

use serde::{Deserialize, Serialize};

// Nomes das coleções no document store
pub const STOCK_ALERTS: &str = "stock_alerts";
pub const STOCK_TRANSFERS: &str = "stock_transfers";

// --- 1. Alerta de Estoque ---
// Condição de estoque baixo/crítico numa ferme, aguardando reconhecimento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub secteur_id: String,
    #[serde(default)]
    pub acknowledged: bool,
    pub article: Option<String>,
    pub message: Option<String>,
}

// --- 2. Status de Transferência ---
// Conjunto aberto: qualquer status desconhecido vira `Other` e não conta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    InTransit,
    Completed,
    Cancelled,
    #[serde(other)]
    Other,
}

impl TransferStatus {
    /// Transferências que ainda exigem ação da ferme de destino.
    pub fn is_actionable(&self) -> bool {
        matches!(self, TransferStatus::Pending | TransferStatus::InTransit)
    }
}

// --- 3. Transferência de Estoque ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockTransfer {
    #[serde(default)]
    pub id: String,
    pub from_secteur_id: Option<String>,
    #[serde(default)]
    pub to_secteur_id: String,
    pub status: TransferStatus,
    pub article: Option<String>,
}

// Resposta de GET /api/notifications/stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockNotificationCount {
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_transfer_status_is_not_actionable() {
        let t: StockTransfer = serde_json::from_value(json!({
            "toSecteurId": "f1",
            "status": "archived"
        }))
        .unwrap();
        assert_eq!(t.status, TransferStatus::Other);
        assert!(!t.status.is_actionable());

        let t: StockTransfer = serde_json::from_value(json!({
            "toSecteurId": "f1",
            "status": "in_transit"
        }))
        .unwrap();
        assert!(t.status.is_actionable());
    }
}
