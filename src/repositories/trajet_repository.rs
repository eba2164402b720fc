use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::pg_store::{PgStore, TrajetRow, TRAJET_COLUMNS};
use crate::models::{Direction, NewTrajet, RouteComputation, TenantContext, Trajet};
use crate::utils::errors::{not_found_error, AppResult};

#[async_trait]
pub trait TrajetRepository: Send + Sync {
    async fn find_trajet(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Trajet>>;

    /// Trajets no borrados de un circuit, opcionalmente filtrados por sentido
    async fn list_trajets(
        &self,
        tenant: &TenantContext,
        circuit_id: Uuid,
        direction: Option<Direction>,
    ) -> AppResult<Vec<Trajet>>;

    async fn create_trajet(&self, tenant: &TenantContext, trajet: NewTrajet) -> AppResult<Trajet>;

    async fn soft_delete_trajet(&self, tenant: &TenantContext, id: Uuid) -> AppResult<()>;

    /// Persiste tramos por arret y totales del trajet en una única transacción
    async fn apply_route_computation(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        computation: &RouteComputation,
    ) -> AppResult<()>;
}

#[async_trait]
impl TrajetRepository for PgStore {
    async fn find_trajet(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Trajet>> {
        let row = sqlx::query_as::<_, TrajetRow>(&format!(
            "SELECT {} FROM trajets WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
            TRAJET_COLUMNS
        ))
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Trajet::try_from).transpose()
    }

    async fn list_trajets(
        &self,
        tenant: &TenantContext,
        circuit_id: Uuid,
        direction: Option<Direction>,
    ) -> AppResult<Vec<Trajet>> {
        let rows = sqlx::query_as::<_, TrajetRow>(&format!(
            "SELECT {} FROM trajets \
             WHERE circuit_id = $1 AND tenant_id = $2 AND deleted_at IS NULL \
             AND ($3::text IS NULL OR direction = $3) \
             ORDER BY created_at",
            TRAJET_COLUMNS
        ))
        .bind(circuit_id)
        .bind(tenant.tenant_id)
        .bind(direction.map(|d| d.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Trajet::try_from).collect()
    }

    async fn create_trajet(&self, tenant: &TenantContext, trajet: NewTrajet) -> AppResult<Trajet> {
        let row = sqlx::query_as::<_, TrajetRow>(&format!(
            "INSERT INTO trajets (id, tenant_id, circuit_id, name, direction, recurrence) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            TRAJET_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tenant.tenant_id)
        .bind(trajet.circuit_id)
        .bind(&trajet.name)
        .bind(trajet.direction.as_str())
        .bind(Json(trajet.recurrence.to_value()))
        .fetch_one(&self.pool)
        .await?;

        Trajet::try_from(row)
    }

    async fn soft_delete_trajet(&self, tenant: &TenantContext, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE trajets SET deleted_at = now() \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant.tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn apply_route_computation(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        computation: &RouteComputation,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for segment in &computation.segments {
            let result = sqlx::query(
                "UPDATE arrets SET distance_km = $1, duration_seconds = $2 \
                 WHERE id = $3 AND trajet_id = $4 AND tenant_id = $5 AND deleted_at IS NULL",
            )
            .bind(segment.distance_km)
            .bind(segment.duration_seconds)
            .bind(segment.arret_id)
            .bind(trajet_id)
            .bind(tenant.tenant_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // El rollback ocurre al soltar la transacción
                return Err(not_found_error("Arret", &segment.arret_id));
            }
        }

        let geometry = computation
            .route_geometry
            .as_ref()
            .map(|g| Json(serde_json::to_value(g).unwrap_or_default()));

        sqlx::query(
            "UPDATE trajets SET total_distance_km = $1, total_duration_seconds = $2, \
             route_geometry = $3, etat = 'ok' \
             WHERE id = $4 AND tenant_id = $5 AND deleted_at IS NULL",
        )
        .bind(computation.total_distance_km)
        .bind(computation.total_duration_seconds)
        .bind(geometry)
        .bind(trajet_id)
        .bind(tenant.tenant_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
