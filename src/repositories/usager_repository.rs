use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::pg_store::{
    PgStore, UsagerAddressRow, UsagerCircuitRow, UsagerRow, USAGER_ADDRESS_COLUMNS,
    USAGER_CIRCUIT_COLUMNS,
};
use crate::models::{
    days_to_value, NewUsagerCircuit, TenantContext, Usager, UsagerAddress, UsagerCircuit,
};
use crate::utils::errors::{map_unique_violation, AppResult};

#[async_trait]
pub trait UsagerRepository: Send + Sync {
    async fn find_usager(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Usager>>;

    async fn find_usager_address(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<UsagerAddress>>;

    async fn find_association(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<UsagerCircuit>>;

    /// Falla con `Conflict` si el par (usager, circuit) ya existe
    async fn create_association(
        &self,
        tenant: &TenantContext,
        association: NewUsagerCircuit,
    ) -> AppResult<UsagerCircuit>;

    async fn update_association(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        association: NewUsagerCircuit,
    ) -> AppResult<Option<UsagerCircuit>>;

    async fn delete_association(&self, tenant: &TenantContext, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
impl UsagerRepository for PgStore {
    async fn find_usager(&self, tenant: &TenantContext, id: Uuid) -> AppResult<Option<Usager>> {
        let row = sqlx::query_as::<_, UsagerRow>(
            "SELECT id, tenant_id, first_name, last_name FROM usagers \
             WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Usager::from))
    }

    async fn find_usager_address(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<UsagerAddress>> {
        let row = sqlx::query_as::<_, UsagerAddressRow>(&format!(
            "SELECT {} FROM usager_addresses WHERE id = $1 AND tenant_id = $2",
            USAGER_ADDRESS_COLUMNS
        ))
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UsagerAddress::from))
    }

    async fn find_association(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> AppResult<Option<UsagerCircuit>> {
        let row = sqlx::query_as::<_, UsagerCircuitRow>(&format!(
            "SELECT {} FROM usager_circuits WHERE id = $1 AND tenant_id = $2",
            USAGER_CIRCUIT_COLUMNS
        ))
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UsagerCircuit::from))
    }

    async fn create_association(
        &self,
        tenant: &TenantContext,
        association: NewUsagerCircuit,
    ) -> AppResult<UsagerCircuit> {
        let row = sqlx::query_as::<_, UsagerCircuitRow>(&format!(
            "INSERT INTO usager_circuits \
             (id, tenant_id, usager_id, circuit_id, usager_address_id, days_aller, days_retour) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            USAGER_CIRCUIT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tenant.tenant_id)
        .bind(association.usager_id)
        .bind(association.circuit_id)
        .bind(association.usager_address_id)
        .bind(Json(days_to_value(&association.days_aller)))
        .bind(Json(days_to_value(&association.days_retour)))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "L'usager est déjà associé à ce circuit"))?;

        Ok(UsagerCircuit::from(row))
    }

    async fn update_association(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        association: NewUsagerCircuit,
    ) -> AppResult<Option<UsagerCircuit>> {
        let row = sqlx::query_as::<_, UsagerCircuitRow>(&format!(
            "UPDATE usager_circuits \
             SET usager_address_id = $1, days_aller = $2, days_retour = $3 \
             WHERE id = $4 AND tenant_id = $5 \
             RETURNING {}",
            USAGER_CIRCUIT_COLUMNS
        ))
        .bind(association.usager_address_id)
        .bind(Json(days_to_value(&association.days_aller)))
        .bind(Json(days_to_value(&association.days_retour)))
        .bind(id)
        .bind(tenant.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UsagerCircuit::from))
    }

    async fn delete_association(&self, tenant: &TenantContext, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM usager_circuits WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant.tenant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
