//! Almacén en memoria
//!
//! Implementa los mismos repositorios que `PgStore` sobre tablas protegidas por un
//! `RwLock`. Se usa con `STORAGE_BACKEND=memory` y en los tests de integración.
//! Las escrituras múltiples validan todos los objetivos antes de modificar nada,
//! lo que equivale a la atomicidad de una transacción.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ArretRepository, CircuitRepository, OccurrenceRepository, TrajetRepository, UsagerRepository,
};
use crate::models::{
    Arret, ArretSchedule, Circuit, CircuitDeletion, Direction, Etablissement, NewArret,
    NewTrajet, NewUsagerCircuit, Occurrence, OccurrenceOverrides, OccurrenceStatus,
    RouteComputation, TenantContext, Trajet, Usager, UsagerAddress, UsagerCircuit,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Fila con marca de borrado lógico
#[derive(Debug, Clone)]
struct Row<T> {
    value: T,
    deleted: bool,
}

impl<T> Row<T> {
    fn live(value: T) -> Self {
        Self {
            value,
            deleted: false,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    etablissements: Vec<Row<Etablissement>>,
    circuits: Vec<Row<Circuit>>,
    usagers: Vec<Row<Usager>>,
    usager_addresses: Vec<UsagerAddress>,
    usager_circuits: Vec<UsagerCircuit>,
    trajets: Vec<Row<Trajet>>,
    arrets: Vec<Row<Arret>>,
    occurrences: Vec<Occurrence>,
}

/// Implementación de los repositorios en memoria
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    /// Si está activo, toda escritura falla con un error de base de datos
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simula una caída de la base de datos en las escrituras
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    // ---- Datos de partida ----

    pub async fn insert_etablissement(&self, etablissement: Etablissement) {
        self.tables.write().await.etablissements.push(Row::live(etablissement));
    }

    pub async fn insert_circuit(&self, circuit: Circuit) {
        self.tables.write().await.circuits.push(Row::live(circuit));
    }

    pub async fn insert_usager(&self, usager: Usager) {
        self.tables.write().await.usagers.push(Row::live(usager));
    }

    pub async fn insert_usager_address(&self, address: UsagerAddress) {
        self.tables.write().await.usager_addresses.push(address);
    }

    pub async fn insert_trajet(&self, trajet: Trajet) {
        self.tables.write().await.trajets.push(Row::live(trajet));
    }

    pub async fn insert_arret_row(&self, arret: Arret) {
        self.tables.write().await.arrets.push(Row::live(arret));
    }

    pub async fn insert_occurrence_row(&self, occurrence: Occurrence) {
        self.tables.write().await.occurrences.push(occurrence);
    }

    // ---- Inspección ----

    /// Indica si el trajet existe y está borrado lógicamente
    pub async fn is_trajet_deleted(&self, id: Uuid) -> bool {
        self.tables
            .read()
            .await
            .trajets
            .iter()
            .any(|row| row.value.id == id && row.deleted)
    }

    pub async fn is_circuit_deleted(&self, id: Uuid) -> bool {
        self.tables
            .read()
            .await
            .circuits
            .iter()
            .any(|row| row.value.id == id && row.deleted)
    }

    /// Número total de asociaciones guardadas, de todos los tenants
    pub async fn association_count(&self) -> usize {
        self.tables.read().await.usager_circuits.len()
    }
}

fn visible<'a, T, F>(rows: &'a [Row<T>], predicate: F) -> impl Iterator<Item = &'a T>
where
    F: Fn(&T) -> bool + 'a,
{
    rows.iter()
        .filter(move |row| !row.deleted && predicate(&row.value))
        .map(|row| &row.value)
}

fn visible_mut<'a, T, F>(rows: &'a mut [Row<T>], predicate: F) -> impl Iterator<Item = &'a mut T>
where
    F: Fn(&T) -> bool + 'a,
{
    rows.iter_mut()
        .filter(move |row| !row.deleted && predicate(&row.value))
        .map(|row| &mut row.value)
}

#[async_trait]
impl CircuitRepository for MemoryStore {
    async fn find_circuit(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Circuit>> {
        let tables = self.tables.read().await;
        let found = visible(&tables.circuits, |c: &Circuit| c.id == id && c.tenant_id == tenant.tenant_id)
            .next()
            .cloned();
        Ok(found)
    }

    async fn find_etablissement(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<Etablissement>> {
        let tables = self.tables.read().await;
        let found = visible(&tables.etablissements, |e: &Etablissement| {
            e.id == id && e.tenant_id == tenant.tenant_id
        })
        .next()
        .cloned();
        Ok(found)
    }

    async fn delete_circuit_cascade(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<CircuitDeletion> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        let mut deletion = CircuitDeletion::default();
        for row in tables.trajets.iter_mut() {
            if !row.deleted && row.value.circuit_id == id && row.value.tenant_id == tenant.tenant_id {
                row.deleted = true;
                deletion.trajets_deleted += 1;
            }
        }

        let before = tables.usager_circuits.len();
        tables
            .usager_circuits
            .retain(|a| !(a.circuit_id == id && a.tenant_id == tenant.tenant_id));
        deletion.associations_removed = (before - tables.usager_circuits.len()) as u64;

        for row in tables.circuits.iter_mut() {
            if !row.deleted && row.value.id == id && row.value.tenant_id == tenant.tenant_id {
                row.deleted = true;
            }
        }

        Ok(deletion)
    }
}

#[async_trait]
impl TrajetRepository for MemoryStore {
    async fn find_trajet(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Trajet>> {
        let tables = self.tables.read().await;
        let found = visible(&tables.trajets, |t: &Trajet| t.id == id && t.tenant_id == tenant.tenant_id)
            .next()
            .cloned();
        Ok(found)
    }

    async fn list_trajets(
        &self,
        tenant: &TenantContext,
        circuit_id: Uuid,
        direction: Option<Direction>,
    ) -> AppResult<Vec<Trajet>> {
        let tables = self.tables.read().await;
        Ok(visible(&tables.trajets, |t: &Trajet| {
            t.circuit_id == circuit_id
                && t.tenant_id == tenant.tenant_id
                && direction.map_or(true, |d| t.direction == d)
        })
        .cloned()
        .collect())
    }

    async fn create_trajet(&self, tenant: &TenantContext, trajet: NewTrajet) -> AppResult<Trajet> {
        self.check_writable()?;
        let created = Trajet {
            id: Uuid::new_v4(),
            tenant_id: tenant.tenant_id,
            circuit_id: trajet.circuit_id,
            name: trajet.name,
            direction: trajet.direction,
            chauffeur_id: None,
            vehicule_id: None,
            departure_time: None,
            recurrence: Some(trajet.recurrence),
            start_date: None,
            end_date: None,
            peages: false,
            total_distance_km: None,
            total_duration_seconds: None,
            route_geometry: None,
            etat: None,
        };

        self.tables.write().await.trajets.push(Row::live(created.clone()));
        Ok(created)
    }

    async fn soft_delete_trajet(&self, tenant: &TenantContext, id: Uuid) -> AppResult<()> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        for row in tables.trajets.iter_mut() {
            if !row.deleted && row.value.id == id && row.value.tenant_id == tenant.tenant_id {
                row.deleted = true;
            }
        }
        Ok(())
    }

    async fn apply_route_computation(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        computation: &RouteComputation,
    ) -> AppResult<()> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        for segment in &computation.segments {
            let exists = visible(&tables.arrets, |a: &Arret| {
                a.id == segment.arret_id
                    && a.trajet_id == trajet_id
                    && a.tenant_id == tenant.tenant_id
            })
            .next()
            .is_some();
            if !exists {
                return Err(not_found_error("Arret", &segment.arret_id));
            }
        }

        for segment in &computation.segments {
            for arret in visible_mut(&mut tables.arrets, |a: &Arret| a.id == segment.arret_id) {
                arret.distance_km = Some(segment.distance_km);
                arret.duration_seconds = Some(segment.duration_seconds);
            }
        }

        for trajet in visible_mut(&mut tables.trajets, |t: &Trajet| {
            t.id == trajet_id && t.tenant_id == tenant.tenant_id
        }) {
            trajet.total_distance_km = Some(computation.total_distance_km);
            trajet.total_duration_seconds = Some(computation.total_duration_seconds);
            trajet.route_geometry = computation.route_geometry.clone();
            trajet.etat = Some("ok".to_string());
        }

        Ok(())
    }
}

#[async_trait]
impl ArretRepository for MemoryStore {
    async fn list_arrets(&self, tenant: &TenantContext, trajet_id: Uuid) -> AppResult<Vec<Arret>> {
        let tables = self.tables.read().await;
        let mut arrets: Vec<Arret> = visible(&tables.arrets, |a: &Arret| {
            a.trajet_id == trajet_id && a.tenant_id == tenant.tenant_id
        })
        .cloned()
        .collect();
        arrets.sort_by_key(|a| a.order_index);
        Ok(arrets)
    }

    async fn find_arret(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Arret>> {
        let tables = self.tables.read().await;
        let found = visible(&tables.arrets, |a: &Arret| a.id == id && a.tenant_id == tenant.tenant_id)
            .next()
            .cloned();
        Ok(found)
    }

    async fn insert_arret(&self, tenant: &TenantContext, arret: NewArret) -> AppResult<Option<Arret>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        if let Some(address_id) = arret.usager_address_id {
            let duplicate = visible(&tables.arrets, |a: &Arret| {
                a.trajet_id == arret.trajet_id && a.usager_address_id == Some(address_id)
            })
            .next()
            .is_some();
            if duplicate {
                return Ok(None);
            }
        }

        let created = Arret {
            id: Uuid::new_v4(),
            tenant_id: tenant.tenant_id,
            trajet_id: arret.trajet_id,
            arret_type: arret.arret_type,
            usager_address_id: arret.usager_address_id,
            etablissement_id: arret.etablissement_id,
            name: arret.name,
            address: arret.address,
            latitude: arret.latitude,
            longitude: arret.longitude,
            order_index: arret.order_index,
            arrival_time: None,
            wait_time: 0,
            distance_km: None,
            duration_seconds: None,
            time_locked: false,
        };
        tables.arrets.push(Row::live(created.clone()));
        Ok(Some(created))
    }

    async fn soft_delete_usager_arrets(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        usager_address_id: Uuid,
    ) -> AppResult<u64> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        let mut removed = 0;
        for row in tables.arrets.iter_mut() {
            let arret = &row.value;
            if !row.deleted
                && arret.trajet_id == trajet_id
                && arret.usager_address_id == Some(usager_address_id)
                && arret.tenant_id == tenant.tenant_id
            {
                row.deleted = true;
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn count_usager_arrets(&self, tenant: &TenantContext, trajet_id: Uuid) -> AppResult<i64> {
        let tables = self.tables.read().await;
        let count = visible(&tables.arrets, |a: &Arret| {
            a.trajet_id == trajet_id
                && a.tenant_id == tenant.tenant_id
                && a.arret_type == crate::models::ArretType::Usager
        })
        .count();
        Ok(count as i64)
    }

    async fn update_arrival_times(
        &self,
        tenant: &TenantContext,
        times: &[(Uuid, NaiveTime)],
    ) -> AppResult<()> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        for (arret_id, arrival_time) in times {
            for arret in visible_mut(&mut tables.arrets, |a: &Arret| {
                a.id == *arret_id && a.tenant_id == tenant.tenant_id
            }) {
                arret.arrival_time = Some(*arrival_time);
            }
        }
        Ok(())
    }

    async fn reorder_arrets(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> AppResult<()> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        for arret_id in ordered_ids {
            let exists = visible(&tables.arrets, |a: &Arret| {
                a.id == *arret_id && a.trajet_id == trajet_id && a.tenant_id == tenant.tenant_id
            })
            .next()
            .is_some();
            if !exists {
                return Err(not_found_error("Arret", arret_id));
            }
        }

        for (index, arret_id) in ordered_ids.iter().enumerate() {
            for arret in visible_mut(&mut tables.arrets, |a: &Arret| a.id == *arret_id) {
                arret.order_index = index as i32;
            }
        }
        Ok(())
    }

    async fn update_arret_schedule(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        schedule: &ArretSchedule,
    ) -> AppResult<Arret> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        let arret = visible_mut(&mut tables.arrets, |a: &Arret| {
            a.id == id && a.tenant_id == tenant.tenant_id
        })
        .next()
        .ok_or_else(|| not_found_error("Arret", &id))?;

        arret.arrival_time = schedule.arrival_time;
        arret.wait_time = schedule.wait_time;
        arret.time_locked = schedule.time_locked;
        Ok(arret.clone())
    }
}

#[async_trait]
impl OccurrenceRepository for MemoryStore {
    async fn insert_occurrences(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        dates: &[NaiveDate],
    ) -> AppResult<u64> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        let mut inserted = 0;
        for date in dates {
            let exists = tables
                .occurrences
                .iter()
                .any(|o| o.trajet_id == trajet_id && o.date == *date);
            if exists {
                continue;
            }

            tables.occurrences.push(Occurrence {
                id: Uuid::new_v4(),
                tenant_id: tenant.tenant_id,
                trajet_id,
                date: *date,
                status: OccurrenceStatus::Planifie,
                chauffeur_id: None,
                vehicule_id: None,
                departure_time: None,
                notes: None,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn list_occurrences(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Occurrence>> {
        let tables = self.tables.read().await;
        let mut occurrences: Vec<Occurrence> = tables
            .occurrences
            .iter()
            .filter(|o| o.trajet_id == trajet_id && o.tenant_id == tenant.tenant_id)
            .filter(|o| from.map_or(true, |f| o.date >= f))
            .filter(|o| to.map_or(true, |t| o.date <= t))
            .cloned()
            .collect();
        occurrences.sort_by_key(|o| o.date);
        Ok(occurrences)
    }

    async fn find_occurrence(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Occurrence>> {
        let tables = self.tables.read().await;
        Ok(tables
            .occurrences
            .iter()
            .find(|o| o.id == id && o.tenant_id == tenant.tenant_id)
            .cloned())
    }

    async fn update_occurrence(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        overrides: &OccurrenceOverrides,
    ) -> AppResult<Option<Occurrence>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        Ok(tables
            .occurrences
            .iter_mut()
            .find(|o| o.id == id && o.tenant_id == tenant.tenant_id)
            .map(|occurrence| {
                occurrence.status = overrides.status;
                occurrence.chauffeur_id = overrides.chauffeur_id;
                occurrence.vehicule_id = overrides.vehicule_id;
                occurrence.departure_time = overrides.departure_time;
                occurrence.notes = overrides.notes.clone();
                occurrence.clone()
            }))
    }

    async fn cancel_occurrence(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Occurrence>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        Ok(tables
            .occurrences
            .iter_mut()
            .find(|o| o.id == id && o.tenant_id == tenant.tenant_id)
            .map(|occurrence| {
                occurrence.status = OccurrenceStatus::Annule;
                occurrence.clone()
            }))
    }
}

#[async_trait]
impl UsagerRepository for MemoryStore {
    async fn find_usager(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Usager>> {
        let tables = self.tables.read().await;
        let found = visible(&tables.usagers, |u: &Usager| u.id == id && u.tenant_id == tenant.tenant_id)
            .next()
            .cloned();
        Ok(found)
    }

    async fn find_usager_address(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<UsagerAddress>> {
        let tables = self.tables.read().await;
        Ok(tables
            .usager_addresses
            .iter()
            .find(|a| a.id == id && a.tenant_id == tenant.tenant_id)
            .cloned())
    }

    async fn find_association(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<UsagerCircuit>> {
        let tables = self.tables.read().await;
        Ok(tables
            .usager_circuits
            .iter()
            .find(|a| a.id == id && a.tenant_id == tenant.tenant_id)
            .cloned())
    }

    async fn create_association(
        &self,
        tenant: &TenantContext,
        association: NewUsagerCircuit,
    ) -> AppResult<UsagerCircuit> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        let duplicate = tables
            .usager_circuits
            .iter()
            .any(|a| a.usager_id == association.usager_id && a.circuit_id == association.circuit_id);
        if duplicate {
            return Err(AppError::Conflict(
                "L'usager est déjà associé à ce circuit".to_string(),
            ));
        }

        let created = UsagerCircuit {
            id: Uuid::new_v4(),
            tenant_id: tenant.tenant_id,
            usager_id: association.usager_id,
            circuit_id: association.circuit_id,
            usager_address_id: association.usager_address_id,
            days_aller: association.days_aller,
            days_retour: association.days_retour,
        };
        tables.usager_circuits.push(created.clone());
        Ok(created)
    }

    async fn update_association(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        association: NewUsagerCircuit,
    ) -> AppResult<Option<UsagerCircuit>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        Ok(tables
            .usager_circuits
            .iter_mut()
            .find(|a| a.id == id && a.tenant_id == tenant.tenant_id)
            .map(|existing| {
                existing.usager_address_id = association.usager_address_id;
                existing.days_aller = association.days_aller;
                existing.days_retour = association.days_retour;
                existing.clone()
            }))
    }

    async fn delete_association(&self, tenant: &TenantContext, id: Uuid) -> AppResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        let before = tables.usager_circuits.len();
        tables
            .usager_circuits
            .retain(|a| !(a.id == id && a.tenant_id == tenant.tenant_id));
        Ok(tables.usager_circuits.len() < before)
    }
}
