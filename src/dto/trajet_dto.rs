use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_unique_ids;

// Request para propagar horarios
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CalculateTimesRequest {
    /// Espera extra aplicada en cada arret, en segundos
    #[serde(default)]
    #[validate(range(min = 0, max = 86400))]
    pub wait_time_seconds: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateTimesResponse {
    pub updated: usize,
}

// Request para reordenar los arrets de un trajet
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderArretsRequest {
    #[validate(length(min = 1), custom = "validate_unique_ids")]
    pub arret_ids: Vec<Uuid>,
}
