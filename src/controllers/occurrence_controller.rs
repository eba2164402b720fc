use uuid::Uuid;
use validator::Validate;

use crate::dto::occurrence_dto::{OccurrenceResponse, UpdateOccurrenceRequest};
use crate::dto::ApiResponse;
use crate::models::TenantContext;
use crate::services::OccurrenceService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct OccurrenceController {
    occurrences: OccurrenceService,
}

impl OccurrenceController {
    pub fn new(state: &AppState) -> Self {
        Self {
            occurrences: OccurrenceService::new(state.store.clone()),
        }
    }

    pub async fn update(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        request: UpdateOccurrenceRequest,
    ) -> Result<ApiResponse<OccurrenceResponse>, AppError> {
        request.validate()?;

        let occurrence = self.occurrences.update(tenant, id, request.into()).await?;
        Ok(ApiResponse::success(occurrence.into()))
    }

    pub async fn cancel(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> Result<ApiResponse<OccurrenceResponse>, AppError> {
        let occurrence = self.occurrences.cancel(tenant, id).await?;
        Ok(ApiResponse::success_with_message(
            occurrence.into(),
            "Occurrence annulée".to_string(),
        ))
    }
}
