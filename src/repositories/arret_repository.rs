use async_trait::async_trait;
use chrono::NaiveTime;
use uuid::Uuid;

use super::pg_store::{ArretRow, PgStore, ARRET_COLUMNS};
use crate::models::{Arret, ArretSchedule, NewArret, TenantContext};
use crate::utils::errors::{not_found_error, AppResult};

#[async_trait]
pub trait ArretRepository: Send + Sync {
    /// Arrets no borrados de un trajet, ordenados por `order_index`
    async fn list_arrets(&self, tenant: &TenantContext, trajet_id: Uuid) -> AppResult<Vec<Arret>>;

    async fn find_arret(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Arret>>;

    /// Inserta un arret. Devuelve `None` si ya existe un arret activo para la misma
    /// dirección de usager en ese trajet.
    async fn insert_arret(&self, tenant: &TenantContext, arret: NewArret) -> AppResult<Option<Arret>>;

    /// Borrado lógico de los arrets de un trajet que apuntan a una dirección de usager
    async fn soft_delete_usager_arrets(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        usager_address_id: Uuid,
    ) -> AppResult<u64>;

    async fn count_usager_arrets(&self, tenant: &TenantContext, trajet_id: Uuid) -> AppResult<i64>;

    /// Escribe todos los horarios en una única transacción
    async fn update_arrival_times(
        &self,
        tenant: &TenantContext,
        times: &[(Uuid, NaiveTime)],
    ) -> AppResult<()>;

    /// Asigna `order_index` 0..n-1 siguiendo `ordered_ids`, de forma atómica
    async fn reorder_arrets(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> AppResult<()>;

    /// Escribe los valores de horario ya resueltos de un arret
    async fn update_arret_schedule(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        schedule: &ArretSchedule,
    ) -> AppResult<Arret>;
}

#[async_trait]
impl ArretRepository for PgStore {
    async fn list_arrets(&self, tenant: &TenantContext, trajet_id: Uuid) -> AppResult<Vec<Arret>> {
        let rows = sqlx::query_as::<_, ArretRow>(&format!(
            "SELECT {} FROM arrets \
             WHERE trajet_id = $1 AND tenant_id = $2 AND deleted_at IS NULL \
             ORDER BY order_index ASC",
            ARRET_COLUMNS
        ))
        .bind(trajet_id)
        .bind(tenant.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Arret::try_from).collect()
    }

    async fn find_arret(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Arret>> {
        let row = sqlx::query_as::<_, ArretRow>(&format!(
            "SELECT {} FROM arrets WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
            ARRET_COLUMNS
        ))
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Arret::try_from).transpose()
    }

    async fn insert_arret(&self, tenant: &TenantContext, arret: NewArret) -> AppResult<Option<Arret>> {
        let row = sqlx::query_as::<_, ArretRow>(&format!(
            "INSERT INTO arrets (id, tenant_id, trajet_id, arret_type, usager_address_id, \
             etablissement_id, name, address, latitude, longitude, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (trajet_id, usager_address_id) \
             WHERE deleted_at IS NULL AND usager_address_id IS NOT NULL DO NOTHING \
             RETURNING {}",
            ARRET_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tenant.tenant_id)
        .bind(arret.trajet_id)
        .bind(arret.arret_type.as_str())
        .bind(arret.usager_address_id)
        .bind(arret.etablissement_id)
        .bind(&arret.name)
        .bind(&arret.address)
        .bind(arret.latitude)
        .bind(arret.longitude)
        .bind(arret.order_index)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Arret::try_from).transpose()
    }

    async fn soft_delete_usager_arrets(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        usager_address_id: Uuid,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE arrets SET deleted_at = now() \
             WHERE trajet_id = $1 AND usager_address_id = $2 AND tenant_id = $3 \
             AND deleted_at IS NULL",
        )
        .bind(trajet_id)
        .bind(usager_address_id)
        .bind(tenant.tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_usager_arrets(&self, tenant: &TenantContext, trajet_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM arrets \
             WHERE trajet_id = $1 AND tenant_id = $2 AND arret_type = 'usager' \
             AND deleted_at IS NULL",
        )
        .bind(trajet_id)
        .bind(tenant.tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update_arrival_times(
        &self,
        tenant: &TenantContext,
        times: &[(Uuid, NaiveTime)],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for (arret_id, arrival_time) in times {
            sqlx::query(
                "UPDATE arrets SET arrival_time = $1 \
                 WHERE id = $2 AND tenant_id = $3 AND deleted_at IS NULL",
            )
            .bind(arrival_time)
            .bind(arret_id)
            .bind(tenant.tenant_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn reorder_arrets(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for (index, arret_id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE arrets SET order_index = $1 \
                 WHERE id = $2 AND trajet_id = $3 AND tenant_id = $4 AND deleted_at IS NULL",
            )
            .bind(index as i32)
            .bind(arret_id)
            .bind(trajet_id)
            .bind(tenant.tenant_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(not_found_error("Arret", arret_id));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_arret_schedule(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        schedule: &ArretSchedule,
    ) -> AppResult<Arret> {
        let row = sqlx::query_as::<_, ArretRow>(&format!(
            "UPDATE arrets SET arrival_time = $1, wait_time = $2, time_locked = $3 \
             WHERE id = $4 AND tenant_id = $5 AND deleted_at IS NULL \
             RETURNING {}",
            ARRET_COLUMNS
        ))
        .bind(schedule.arrival_time)
        .bind(schedule.wait_time)
        .bind(schedule.time_locked)
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Arret", &id))?;

        Arret::try_from(row)
    }
}
