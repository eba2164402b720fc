//! Modelo de Arret
//!
//! Parada ordenada de un trajet. `order_index` es contiguo desde 0 y el
//! establecimiento ocupa por convención el índice 0.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArretType {
    Usager,
    Etablissement,
}

impl ArretType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArretType::Usager => "usager",
            ArretType::Etablissement => "etablissement",
        }
    }
}

impl FromStr for ArretType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usager" => Ok(ArretType::Usager),
            "etablissement" => Ok(ArretType::Etablissement),
            other => Err(format!("type d'arrêt inconnu: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Arret {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub trajet_id: Uuid,
    pub arret_type: ArretType,
    pub usager_address_id: Option<Uuid>,
    pub etablissement_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub order_index: i32,
    #[serde(with = "crate::utils::time_format::hhmm_option")]
    pub arrival_time: Option<NaiveTime>,
    /// Minutos de espera en la parada
    pub wait_time: i32,
    /// Tramo desde el arret anterior
    pub distance_km: Option<Decimal>,
    pub duration_seconds: Option<i32>,
    /// Si es verdadero, `arrival_time` es un ancla que la propagación no recalcula
    pub time_locked: bool,
}

impl Arret {
    /// Coordenadas [lon, lat] si ambas están presentes
    pub fn coordinates(&self) -> Option<[f64; 2]> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Some([lon, lat]),
            _ => None,
        }
    }

    /// Ancla fija para la propagación de horarios
    pub fn locked_time(&self) -> Option<NaiveTime> {
        if self.time_locked {
            self.arrival_time
        } else {
            None
        }
    }
}

/// Datos para insertar un arret
#[derive(Debug, Clone)]
pub struct NewArret {
    pub trajet_id: Uuid,
    pub arret_type: ArretType,
    pub usager_address_id: Option<Uuid>,
    pub etablissement_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub order_index: i32,
}

/// Cambios manuales de horario sobre un arret; `None` conserva el valor actual
#[derive(Debug, Clone, Default)]
pub struct ArretScheduleUpdate {
    pub arrival_time: Option<Option<NaiveTime>>,
    pub wait_time: Option<i32>,
    pub time_locked: Option<bool>,
}

/// Horario resuelto de un arret
#[derive(Debug, Clone, PartialEq)]
pub struct ArretSchedule {
    pub arrival_time: Option<NaiveTime>,
    pub wait_time: i32,
    pub time_locked: bool,
}

impl ArretScheduleUpdate {
    /// Aplica los cambios sobre el horario actual del arret
    pub fn resolve(&self, current: &Arret) -> ArretSchedule {
        ArretSchedule {
            arrival_time: self.arrival_time.unwrap_or(current.arrival_time),
            wait_time: self.wait_time.unwrap_or(current.wait_time),
            time_locked: self.time_locked.unwrap_or(current.time_locked),
        }
    }
}
