//! Modelo de Circuit y Etablissement
//!
//! Un circuit agrupa varios trajets y aporta los valores por defecto
//! (días de operación, ventana de validez) que los trajets heredan.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::day_entry::DayEntry;

/// Establecimiento escolar - destino (aller) u origen (retour) de los trajets
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Etablissement {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Circuit {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub etablissement_id: Option<Uuid>,
    pub name: String,
    pub is_active: bool,
    pub operating_days: Vec<DayEntry>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Resultado del borrado en cascada de un circuit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitDeletion {
    pub trajets_deleted: u64,
    pub associations_removed: u64,
}
