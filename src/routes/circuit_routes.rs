use axum::{
    extract::{Path, State},
    routing::delete,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::circuit_controller::CircuitController;
use crate::dto::ApiResponse;
use crate::models::{CircuitDeletion, TenantContext};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_circuit_router() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_circuit))
}

async fn delete_circuit(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CircuitDeletion>>, AppError> {
    let controller = CircuitController::new(&state);
    let response = controller.delete(&tenant, id).await?;
    Ok(Json(response))
}
