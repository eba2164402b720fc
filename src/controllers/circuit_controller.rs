use uuid::Uuid;

use crate::dto::ApiResponse;
use crate::models::{CircuitDeletion, TenantContext};
use crate::services::CircuitService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct CircuitController {
    circuits: CircuitService,
}

impl CircuitController {
    pub fn new(state: &AppState) -> Self {
        Self {
            circuits: CircuitService::new(state.store.clone()),
        }
    }

    pub async fn delete(
        &self,
        tenant: &TenantContext,
        id: Uuid,
    ) -> Result<ApiResponse<CircuitDeletion>, AppError> {
        let deletion = self.circuits.delete_circuit(tenant, id).await?;
        Ok(ApiResponse::success_with_message(
            deletion,
            "Circuit supprimé".to_string(),
        ))
    }
}
