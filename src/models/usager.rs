//! Modelo de Usager, direcciones y asociación usager-circuit
//!
//! Los `days_aller` / `days_retour` de la dirección son la fuente de verdad de la
//! planificación; la asociación guarda una copia tomada en cada alta/modificación.

use serde::Serialize;
use uuid::Uuid;

use super::day_entry::DayEntry;
use super::trajet::Direction;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usager {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl Usager {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Una de las (hasta 4) direcciones de un usager
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagerAddress {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub usager_id: Uuid,
    pub position: i16,
    pub label: Option<String>,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub transport_type: Option<String>,
    /// Algunos tipos de transporte nunca requieren circuit
    pub needs_circuit: bool,
    pub days_aller: Vec<DayEntry>,
    pub days_retour: Vec<DayEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagerCircuit {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub usager_id: Uuid,
    pub circuit_id: Uuid,
    pub usager_address_id: Uuid,
    pub days_aller: Vec<DayEntry>,
    pub days_retour: Vec<DayEntry>,
}

impl UsagerCircuit {
    pub fn days_for(&self, direction: Direction) -> &[DayEntry] {
        match direction {
            Direction::Aller => &self.days_aller,
            Direction::Retour => &self.days_retour,
        }
    }
}

/// Datos para crear o actualizar una asociación
#[derive(Debug, Clone)]
pub struct NewUsagerCircuit {
    pub usager_id: Uuid,
    pub circuit_id: Uuid,
    pub usager_address_id: Uuid,
    pub days_aller: Vec<DayEntry>,
    pub days_retour: Vec<DayEntry>,
}
