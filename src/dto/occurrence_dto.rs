use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{OccurrenceOverrides, OccurrenceStatus, ResolvedOccurrence};

// Request para generar ocurrencias sobre una ventana de fechas
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOccurrencesRequest {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOccurrencesResponse {
    pub inserted: u64,
}

// Filtros del listado
#[derive(Debug, Default, Deserialize)]
pub struct ListOccurrencesQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// Request para reemplazar los overrides de una ocurrencia
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOccurrenceRequest {
    pub status: OccurrenceStatus,
    #[serde(default)]
    pub chauffeur_id: Option<Uuid>,
    #[serde(default)]
    pub vehicule_id: Option<Uuid>,
    #[serde(default, with = "crate::utils::time_format::hhmm_option")]
    pub departure_time: Option<NaiveTime>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<UpdateOccurrenceRequest> for OccurrenceOverrides {
    fn from(request: UpdateOccurrenceRequest) -> Self {
        Self {
            status: request.status,
            chauffeur_id: request.chauffeur_id,
            vehicule_id: request.vehicule_id,
            departure_time: request.departure_time,
            notes: request.notes,
        }
    }
}

// Response de ocurrencia: overrides crudos y valores efectivos
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceResponse {
    pub id: Uuid,
    pub trajet_id: Uuid,
    pub date: NaiveDate,
    pub status: OccurrenceStatus,
    pub chauffeur_id: Option<Uuid>,
    pub vehicule_id: Option<Uuid>,
    #[serde(with = "crate::utils::time_format::hhmm_option")]
    pub departure_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub effective_chauffeur_id: Option<Uuid>,
    pub effective_vehicule_id: Option<Uuid>,
    #[serde(with = "crate::utils::time_format::hhmm_option")]
    pub effective_departure_time: Option<NaiveTime>,
}

impl From<ResolvedOccurrence> for OccurrenceResponse {
    fn from(resolved: ResolvedOccurrence) -> Self {
        let ResolvedOccurrence {
            occurrence,
            effective,
        } = resolved;

        Self {
            id: occurrence.id,
            trajet_id: occurrence.trajet_id,
            date: occurrence.date,
            status: occurrence.status,
            chauffeur_id: occurrence.chauffeur_id,
            vehicule_id: occurrence.vehicule_id,
            departure_time: occurrence.departure_time,
            notes: occurrence.notes,
            effective_chauffeur_id: effective.chauffeur_id,
            effective_vehicule_id: effective.vehicule_id,
            effective_departure_time: effective.departure_time,
        }
    }
}
