//! Modelo de Trajet
//!
//! Un trajet es una ruta direccional y recurrente sobre un circuit. Las fechas
//! efectivas caen al valor del circuit cuando el trajet no define las suyas.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::circuit::Circuit;
use super::day_entry::{normalize_days, DayEntry};

/// Sentido del trajet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Hacia el establecimiento
    Aller,
    /// Desde el establecimiento
    Retour,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Aller => "aller",
            Direction::Retour => "retour",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Aller => "Aller",
            Direction::Retour => "Retour",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aller" => Ok(Direction::Aller),
            "retour" => Ok(Direction::Retour),
            other => Err(format!("direction inconnue: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
}

/// Regla de recurrencia semanal del trajet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub frequency: Frequency,
    pub days_of_week: Vec<DayEntry>,
}

impl Recurrence {
    pub fn weekly(days_of_week: Vec<DayEntry>) -> Self {
        Self {
            frequency: Frequency::Weekly,
            days_of_week,
        }
    }

    /// Interpreta la columna JSONB cruda; `daysOfWeek` pasa por la normalización de días
    pub fn from_value(raw: &Value) -> Option<Self> {
        let days = raw.get("daysOfWeek")?;
        Some(Self::weekly(normalize_days(days)))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Geometría GeoJSON de la ruta, pares [lon, lat]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl LineString {
    pub fn new(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            geometry_type: "LineString".to_string(),
            coordinates,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trajet {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub circuit_id: Uuid,
    pub name: String,
    pub direction: Direction,
    pub chauffeur_id: Option<Uuid>,
    pub vehicule_id: Option<Uuid>,
    #[serde(with = "crate::utils::time_format::hhmm_option")]
    pub departure_time: Option<NaiveTime>,
    pub recurrence: Option<Recurrence>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Peajes permitidos; si es falso se excluyen las autopistas
    pub peages: bool,
    pub total_distance_km: Option<Decimal>,
    pub total_duration_seconds: Option<i32>,
    pub route_geometry: Option<LineString>,
    pub etat: Option<String>,
}

impl Trajet {
    /// Días de recurrencia propios del trajet (no hay herencia desde el circuit)
    pub fn effective_days(&self) -> &[DayEntry] {
        self.recurrence
            .as_ref()
            .map(|r| r.days_of_week.as_slice())
            .unwrap_or(&[])
    }

    pub fn effective_start_date(&self, circuit: &Circuit) -> Option<NaiveDate> {
        self.start_date.or(circuit.start_date)
    }

    pub fn effective_end_date(&self, circuit: &Circuit) -> Option<NaiveDate> {
        self.end_date.or(circuit.end_date)
    }
}

/// Datos para crear un trajet
#[derive(Debug, Clone)]
pub struct NewTrajet {
    pub circuit_id: Uuid,
    pub name: String,
    pub direction: Direction,
    pub recurrence: Recurrence,
}

/// Resultado completo de un cálculo de ruta, aplicado de forma atómica
#[derive(Debug, Clone)]
pub struct RouteComputation {
    pub segments: Vec<ArretSegment>,
    pub total_distance_km: Decimal,
    pub total_duration_seconds: i32,
    pub route_geometry: Option<LineString>,
}

/// Tramo registrado sobre el arret de destino
#[derive(Debug, Clone, PartialEq)]
pub struct ArretSegment {
    pub arret_id: Uuid,
    pub distance_km: Decimal,
    pub duration_seconds: i32,
}
