use async_trait::async_trait;
use uuid::Uuid;

use super::pg_store::{CircuitRow, EtablissementRow, PgStore, CIRCUIT_COLUMNS, ETABLISSEMENT_COLUMNS};
use crate::models::{Circuit, CircuitDeletion, Etablissement, TenantContext};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait CircuitRepository: Send + Sync {
    async fn find_circuit(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Circuit>>;

    async fn find_etablissement(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<Etablissement>>;

    /// Borrado lógico del circuit y sus trajets, y eliminación de sus asociaciones,
    /// en una sola transacción
    async fn delete_circuit_cascade(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<CircuitDeletion>;
}

#[async_trait]
impl CircuitRepository for PgStore {
    async fn find_circuit(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Circuit>> {
        let row = sqlx::query_as::<_, CircuitRow>(&format!(
            "SELECT {} FROM circuits WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
            CIRCUIT_COLUMNS
        ))
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Circuit::from))
    }

    async fn find_etablissement(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<Etablissement>> {
        let row = sqlx::query_as::<_, EtablissementRow>(&format!(
            "SELECT {} FROM etablissements WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
            ETABLISSEMENT_COLUMNS
        ))
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Etablissement::from))
    }

    async fn delete_circuit_cascade(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<CircuitDeletion> {
        let mut tx = self.pool.begin().await?;

        let trajets = sqlx::query(
            "UPDATE trajets SET deleted_at = now() \
             WHERE circuit_id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant.tenant_id)
        .execute(&mut *tx)
        .await?;

        let associations = sqlx::query("DELETE FROM usager_circuits WHERE circuit_id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant.tenant_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE circuits SET deleted_at = now() \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant.tenant_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CircuitDeletion {
            trajets_deleted: trajets.rows_affected(),
            associations_removed: associations.rows_affected(),
        })
    }
}
