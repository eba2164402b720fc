use uuid::Uuid;
use validator::Validate;

use crate::dto::association_dto::{CreateAssociationRequest, UpdateAssociationRequest};
use crate::dto::ApiResponse;
use crate::models::{TenantContext, UsagerCircuit};
use crate::services::AssociationService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AssociationController {
    associations: AssociationService,
}

impl AssociationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            associations: AssociationService::new(state.store.clone()),
        }
    }

    pub async fn create(
        &self,
        tenant: &TenantContext,
        request: CreateAssociationRequest,
    ) -> Result<ApiResponse<UsagerCircuit>, AppError> {
        request.validate()?;

        let association = self
            .associations
            .create(
                tenant,
                request.usager_id,
                request.circuit_id,
                request.usager_address_id,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            association,
            "Usager associé au circuit".to_string(),
        ))
    }

    pub async fn update(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        request: UpdateAssociationRequest,
    ) -> Result<ApiResponse<UsagerCircuit>, AppError> {
        request.validate()?;

        let association = self
            .associations
            .update(tenant, id, request.usager_address_id)
            .await?;

        Ok(ApiResponse::success(association))
    }

    pub async fn delete(&self, tenant: &TenantContext, id: Uuid) -> Result<(), AppError> {
        self.associations.delete(tenant, id).await
    }
}
