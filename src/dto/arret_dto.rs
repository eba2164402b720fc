use chrono::NaiveTime;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::models::ArretScheduleUpdate;
use crate::utils::time_format::parse_hhmm;

/// `arrivalTime` ausente no cambia nada; `null` borra la hora
fn deserialize_arrival_time<'de, D>(deserializer: D) -> Result<Option<Option<NaiveTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Some(None)),
        Some(raw) => parse_hhmm(&raw)
            .map(|time| Some(Some(time)))
            .ok_or_else(|| D::Error::custom(format!("heure invalide: {}", raw))),
    }
}

// Request para fijar o liberar la hora de un arret
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArretScheduleRequest {
    #[serde(default, deserialize_with = "deserialize_arrival_time")]
    pub arrival_time: Option<Option<NaiveTime>>,
    #[serde(default)]
    #[validate(range(min = 0, max = 1440))]
    pub wait_time: Option<i32>,
    #[serde(default)]
    pub time_locked: Option<bool>,
}

impl From<UpdateArretScheduleRequest> for ArretScheduleUpdate {
    fn from(request: UpdateArretScheduleRequest) -> Self {
        Self {
            arrival_time: request.arrival_time,
            wait_time: request.wait_time,
            time_locked: request.time_locked,
        }
    }
}
