// src/models/ferme.rs

use serde::{Deserialize, Serialize};

pub const FERMES: &str = "fermes";

// A unidade organizacional ("Ferme"). Aqui só é usada para buscar o rótulo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ferme {
    #[serde(default)]
    pub id: String,
    pub nom: String,
}
