//! Modelo de TrajetOccurrence
//!
//! Instancia concreta de un trajet en una fecha. Los campos de override son
//! opcionales; el valor mostrado es override ?? valor por defecto del trajet.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::trajet::Trajet;

/// Estado de la ocurrencia: planifie -> en_cours -> termine, planifie|en_cours -> annule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Planifie,
    EnCours,
    Termine,
    Annule,
}

impl OccurrenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceStatus::Planifie => "planifie",
            OccurrenceStatus::EnCours => "en_cours",
            OccurrenceStatus::Termine => "termine",
            OccurrenceStatus::Annule => "annule",
        }
    }
}

impl FromStr for OccurrenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planifie" => Ok(OccurrenceStatus::Planifie),
            "en_cours" => Ok(OccurrenceStatus::EnCours),
            "termine" => Ok(OccurrenceStatus::Termine),
            "annule" => Ok(OccurrenceStatus::Annule),
            other => Err(format!("statut inconnu: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub trajet_id: Uuid,
    pub date: NaiveDate,
    pub status: OccurrenceStatus,
    pub chauffeur_id: Option<Uuid>,
    pub vehicule_id: Option<Uuid>,
    #[serde(with = "crate::utils::time_format::hhmm_option")]
    pub departure_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Overrides de una ocurrencia. Se reemplazan en bloque: `None` borra el override.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceOverrides {
    pub status: OccurrenceStatus,
    pub chauffeur_id: Option<Uuid>,
    pub vehicule_id: Option<Uuid>,
    pub departure_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Asignación efectiva de una ocurrencia
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveAssignment {
    pub chauffeur_id: Option<Uuid>,
    pub vehicule_id: Option<Uuid>,
    pub departure_time: Option<NaiveTime>,
}

impl Occurrence {
    pub fn effective(&self, trajet: &Trajet) -> EffectiveAssignment {
        EffectiveAssignment {
            chauffeur_id: self.chauffeur_id.or(trajet.chauffeur_id),
            vehicule_id: self.vehicule_id.or(trajet.vehicule_id),
            departure_time: self.departure_time.or(trajet.departure_time),
        }
    }
}

/// Ocurrencia acompañada de sus valores efectivos
#[derive(Debug, Clone)]
pub struct ResolvedOccurrence {
    pub occurrence: Occurrence,
    pub effective: EffectiveAssignment,
}

impl ResolvedOccurrence {
    pub fn new(occurrence: Occurrence, trajet: &Trajet) -> Self {
        let effective = occurrence.effective(trajet);
        Self {
            occurrence,
            effective,
        }
    }
}
