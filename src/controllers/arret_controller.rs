use uuid::Uuid;
use validator::Validate;

use crate::dto::arret_dto::UpdateArretScheduleRequest;
use crate::dto::ApiResponse;
use crate::models::{Arret, TenantContext};
use crate::services::ScheduleService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct ArretController {
    schedule: ScheduleService,
}

impl ArretController {
    pub fn new(state: &AppState) -> Self {
        Self {
            schedule: ScheduleService::new(state.store.clone()),
        }
    }

    pub async fn update_schedule(
        &self,
        tenant: &TenantContext,
        arret_id: Uuid,
        request: UpdateArretScheduleRequest,
    ) -> Result<ApiResponse<Arret>, AppError> {
        request.validate()?;

        let arret = self
            .schedule
            .update_arret_schedule(tenant, arret_id, request.into())
            .await?;

        Ok(ApiResponse::success(arret))
    }
}
