//! Propagación de horarios
//!
//! A partir de las duraciones de tramo ya calculadas, las esperas por arret y una
//! espera global, propaga las horas de llegada hacia atrás (aller, ancla en el
//! último arret) o hacia delante (retour, ancla en el primero). Un arret bloqueado
//! con hora nunca se recalcula y reancla la propagación.

use chrono::NaiveTime;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Arret, ArretScheduleUpdate, Direction, TenantContext};
use crate::repositories::Store;
use crate::utils::errors::{not_found_error, validation_failure, AppResult};
use crate::utils::time_format::{from_seconds, to_seconds};

/// Hora de ancla cuando ni el arret ni el trajet tienen una
pub fn default_anchor_time() -> NaiveTime {
    from_seconds(8 * 3600)
}

/// Datos de un arret necesarios para la propagación
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopTiming {
    pub arrival_time: Option<NaiveTime>,
    /// Hora fija si el arret está bloqueado y tiene hora
    pub locked_time: Option<NaiveTime>,
    /// Minutos de espera en el arret
    pub wait_minutes: i32,
    /// Duración del tramo que llega a este arret
    pub duration_seconds: i32,
}

impl From<&Arret> for StopTiming {
    fn from(arret: &Arret) -> Self {
        Self {
            arrival_time: arret.arrival_time,
            locked_time: arret.locked_time(),
            wait_minutes: arret.wait_time,
            duration_seconds: arret.duration_seconds.unwrap_or(0),
        }
    }
}

fn wait_seconds(stop: &StopTiming, global_wait_seconds: i64) -> i64 {
    i64::from(stop.wait_minutes) * 60 + global_wait_seconds
}

/// Calcula la hora de llegada de cada arret. Devuelve una hora por arret, en orden;
/// los arrets bloqueados conservan su propia hora.
pub fn propagate_times(
    direction: Direction,
    stops: &[StopTiming],
    fallback_anchor: NaiveTime,
    global_wait_seconds: i64,
) -> Vec<NaiveTime> {
    if stops.is_empty() {
        return Vec::new();
    }

    let mut times = vec![fallback_anchor; stops.len()];

    match direction {
        Direction::Aller => {
            let last = stops.len() - 1;
            let anchor = stops[last]
                .locked_time
                .or(stops[last].arrival_time)
                .unwrap_or(fallback_anchor);
            times[last] = anchor;

            let mut cursor = to_seconds(anchor);
            for index in (0..last).rev() {
                let stop = &stops[index];
                if let Some(locked) = stop.locked_time {
                    cursor = to_seconds(locked);
                    times[index] = locked;
                    continue;
                }
                cursor = cursor
                    - i64::from(stops[index + 1].duration_seconds)
                    - wait_seconds(stop, global_wait_seconds);
                times[index] = from_seconds(cursor);
            }
        }
        Direction::Retour => {
            let anchor = stops[0]
                .locked_time
                .or(stops[0].arrival_time)
                .unwrap_or(fallback_anchor);
            times[0] = anchor;

            let mut cursor = to_seconds(anchor);
            for index in 1..stops.len() {
                let stop = &stops[index];
                if let Some(locked) = stop.locked_time {
                    cursor = to_seconds(locked);
                    times[index] = locked;
                    continue;
                }
                cursor = cursor
                    + i64::from(stop.duration_seconds)
                    + wait_seconds(&stops[index - 1], global_wait_seconds);
                times[index] = from_seconds(cursor);
            }
        }
    }

    times
}

#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn Store>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Recalcula y persiste las horas de llegada. Devuelve el número de arrets considerados.
    pub async fn calculate_times(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        wait_time_seconds: i64,
    ) -> AppResult<usize> {
        let trajet = self
            .store
            .find_trajet(tenant, trajet_id)
            .await?
            .ok_or_else(|| not_found_error("Trajet", &trajet_id))?;

        let arrets = self.store.list_arrets(tenant, trajet_id).await?;
        if arrets.len() < 2 {
            return Ok(0);
        }

        let stops: Vec<StopTiming> = arrets.iter().map(StopTiming::from).collect();
        let fallback = trajet.departure_time.unwrap_or_else(default_anchor_time);
        let times = propagate_times(trajet.direction, &stops, fallback, wait_time_seconds);

        let updates: Vec<(Uuid, NaiveTime)> = arrets
            .iter()
            .zip(times)
            .filter(|(arret, _)| arret.locked_time().is_none())
            .map(|(arret, time)| (arret.id, time))
            .collect();

        self.store.update_arrival_times(tenant, &updates).await?;

        log::info!(
            "⏱️ Horaires du trajet '{}' recalculés ({} arrêts, {} modifiés)",
            trajet.name,
            arrets.len(),
            updates.len()
        );
        Ok(arrets.len())
    }

    /// Reordena los arrets. La lista debe contener exactamente los arrets del trajet.
    pub async fn reorder_arrets(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> AppResult<Vec<Arret>> {
        self.store
            .find_trajet(tenant, trajet_id)
            .await?
            .ok_or_else(|| not_found_error("Trajet", &trajet_id))?;

        let arrets = self.store.list_arrets(tenant, trajet_id).await?;
        let current: HashSet<Uuid> = arrets.iter().map(|a| a.id).collect();
        let requested: HashSet<Uuid> = ordered_ids.iter().copied().collect();

        if requested.len() != ordered_ids.len() || current != requested {
            return Err(validation_failure(
                "La liste doit contenir exactement les arrêts du trajet",
            ));
        }

        self.store
            .reorder_arrets(tenant, trajet_id, ordered_ids)
            .await?;
        self.store.list_arrets(tenant, trajet_id).await
    }

    /// Fija o libera la hora de un arret y ajusta su espera
    pub async fn update_arret_schedule(
        &self,
        tenant: &TenantContext,
        arret_id: Uuid,
        update: ArretScheduleUpdate,
    ) -> AppResult<Arret> {
        let arret = self
            .store
            .find_arret(tenant, arret_id)
            .await?
            .ok_or_else(|| not_found_error("Arret", &arret_id))?;

        let schedule = update.resolve(&arret);
        if schedule.time_locked && schedule.arrival_time.is_none() {
            return Err(validation_failure(
                "Un arrêt verrouillé doit avoir une heure d'arrivée",
            ));
        }
        if schedule.wait_time < 0 {
            return Err(validation_failure("Le temps d'attente ne peut pas être négatif"));
        }

        self.store
            .update_arret_schedule(tenant, arret_id, &schedule)
            .await
    }
}
