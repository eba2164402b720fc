//! Generación y mantenimiento de ocurrencias
//!
//! Expande la recurrencia efectiva de un trajet sobre una ventana de fechas. La
//! inserción ignora las fechas ya existentes, por lo que es seguro repetirla.

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    is_any_day_active_for_date, Circuit, DayEntry, Occurrence, OccurrenceOverrides,
    ResolvedOccurrence, TenantContext, Trajet,
};
use crate::repositories::Store;
use crate::utils::errors::{not_found_error, validation_failure, AppResult};

/// Fechas activas dentro de `[from, to]` recortado a la ventana efectiva del trajet
pub fn occurrence_dates(
    days: &[DayEntry],
    effective_start: Option<NaiveDate>,
    effective_end: Option<NaiveDate>,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    let start = effective_start.map_or(from, |s| s.max(from));
    let end = effective_end.map_or(to, |e| e.min(to));

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| is_any_day_active_for_date(days, *date))
        .collect()
}

#[derive(Clone)]
pub struct OccurrenceService {
    store: Arc<dyn Store>,
}

impl OccurrenceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn load_trajet(&self, tenant: &TenantContext, trajet_id: Uuid) -> AppResult<Trajet> {
        self.store
            .find_trajet(tenant, trajet_id)
            .await?
            .ok_or_else(|| not_found_error("Trajet", &trajet_id))
    }

    async fn load_circuit(&self, tenant: &TenantContext, trajet: &Trajet) -> AppResult<Circuit> {
        self.store
            .find_circuit(tenant, trajet.circuit_id)
            .await?
            .ok_or_else(|| not_found_error("Circuit", &trajet.circuit_id))
    }

    /// Crea una ocurrencia `planifie` por cada fecha activa. Devuelve cuántas son nuevas.
    pub async fn generate(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<u64> {
        let trajet = self.load_trajet(tenant, trajet_id).await?;
        let circuit = self.load_circuit(tenant, &trajet).await?;

        let days = trajet.effective_days();
        if days.is_empty() {
            return Err(validation_failure(
                "Aucune récurrence configurée pour ce trajet",
            ));
        }

        let dates = occurrence_dates(
            days,
            trajet.effective_start_date(&circuit),
            trajet.effective_end_date(&circuit),
            from,
            to,
        );
        if dates.is_empty() {
            return Ok(0);
        }

        let inserted = self
            .store
            .insert_occurrences(tenant, trajet_id, &dates)
            .await?;

        log::info!(
            "📅 {} occurrence(s) générée(s) pour le trajet {} ({} date(s) actives)",
            inserted,
            trajet_id,
            dates.len()
        );
        Ok(inserted)
    }

    pub async fn list(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<ResolvedOccurrence>> {
        let trajet = self.load_trajet(tenant, trajet_id).await?;
        let occurrences = self
            .store
            .list_occurrences(tenant, trajet_id, from, to)
            .await?;

        Ok(occurrences
            .into_iter()
            .map(|occurrence| ResolvedOccurrence::new(occurrence, &trajet))
            .collect())
    }

    /// Ocurrencia y trajet padre, ambos visibles, antes de cualquier escritura
    async fn load_with_trajet(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<(Occurrence, Trajet)> {
        let occurrence = self
            .store
            .find_occurrence(tenant, id)
            .await?
            .ok_or_else(|| not_found_error("Occurrence", &id))?;
        let trajet = self.load_trajet(tenant, occurrence.trajet_id).await?;
        Ok((occurrence, trajet))
    }

    /// Reemplaza los overrides en bloque; cualquier estado es aceptado
    pub async fn update(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        overrides: OccurrenceOverrides,
    ) -> AppResult<ResolvedOccurrence> {
        let (_, trajet) = self.load_with_trajet(tenant, id).await?;

        let occurrence = self
            .store
            .update_occurrence(tenant, id, &overrides)
            .await?
            .ok_or_else(|| not_found_error("Occurrence", &id))?;

        Ok(ResolvedOccurrence::new(occurrence, &trajet))
    }

    pub async fn cancel(&self, tenant: &TenantContext, id: Uuid) -> AppResult<ResolvedOccurrence> {
        let (_, trajet) = self.load_with_trajet(tenant, id).await?;

        let occurrence = self
            .store
            .cancel_occurrence(tenant, id)
            .await?
            .ok_or_else(|| not_found_error("Occurrence", &id))?;

        log::info!("🚫 Occurrence {} du {} annulée", id, occurrence.date);
        Ok(ResolvedOccurrence::new(occurrence, &trajet))
    }
}
