use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::pg_store::{OccurrenceRow, PgStore, OCCURRENCE_COLUMNS};
use crate::models::{Occurrence, OccurrenceOverrides, OccurrenceStatus, TenantContext};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait OccurrenceRepository: Send + Sync {
    /// Inserta una ocurrencia `planifie` por fecha; las fechas ya existentes se ignoran.
    /// Devuelve el número de filas realmente insertadas.
    async fn insert_occurrences(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        dates: &[NaiveDate],
    ) -> AppResult<u64>;

    async fn list_occurrences(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Occurrence>>;

    async fn find_occurrence(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Occurrence>>;

    /// Reemplaza en bloque los overrides
    async fn update_occurrence(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        overrides: &OccurrenceOverrides,
    ) -> AppResult<Option<Occurrence>>;

    /// Sólo cambia el estado a `annule`
    async fn cancel_occurrence(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Occurrence>>;
}

#[async_trait]
impl OccurrenceRepository for PgStore {
    async fn insert_occurrences(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        dates: &[NaiveDate],
    ) -> AppResult<u64> {
        if dates.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "INSERT INTO trajet_occurrences (id, tenant_id, trajet_id, date, status) \
             SELECT gen_random_uuid(), $1, $2, d, 'planifie' FROM UNNEST($3::date[]) AS d \
             ON CONFLICT (trajet_id, date) DO NOTHING",
        )
        .bind(tenant.tenant_id)
        .bind(trajet_id)
        .bind(dates)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_occurrences(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Occurrence>> {
        let rows = sqlx::query_as::<_, OccurrenceRow>(&format!(
            "SELECT {} FROM trajet_occurrences \
             WHERE trajet_id = $1 AND tenant_id = $2 \
             AND ($3::date IS NULL OR date >= $3) \
             AND ($4::date IS NULL OR date <= $4) \
             ORDER BY date",
            OCCURRENCE_COLUMNS
        ))
        .bind(trajet_id)
        .bind(tenant.tenant_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Occurrence::try_from).collect()
    }

    async fn find_occurrence(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Occurrence>> {
        let row = sqlx::query_as::<_, OccurrenceRow>(&format!(
            "SELECT {} FROM trajet_occurrences WHERE id = $1 AND tenant_id = $2",
            OCCURRENCE_COLUMNS
        ))
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Occurrence::try_from).transpose()
    }

    async fn update_occurrence(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        overrides: &OccurrenceOverrides,
    ) -> AppResult<Option<Occurrence>> {
        let row = sqlx::query_as::<_, OccurrenceRow>(&format!(
            "UPDATE trajet_occurrences \
             SET status = $1, chauffeur_id = $2, vehicule_id = $3, departure_time = $4, notes = $5 \
             WHERE id = $6 AND tenant_id = $7 \
             RETURNING {}",
            OCCURRENCE_COLUMNS
        ))
        .bind(overrides.status.as_str())
        .bind(overrides.chauffeur_id)
        .bind(overrides.vehicule_id)
        .bind(overrides.departure_time)
        .bind(&overrides.notes)
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Occurrence::try_from).transpose()
    }

    async fn cancel_occurrence(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Occurrence>> {
        let row = sqlx::query_as::<_, OccurrenceRow>(&format!(
            "UPDATE trajet_occurrences SET status = $1 \
             WHERE id = $2 AND tenant_id = $3 \
             RETURNING {}",
            OCCURRENCE_COLUMNS
        ))
        .bind(OccurrenceStatus::Annule.as_str())
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Occurrence::try_from).transpose()
    }
}
