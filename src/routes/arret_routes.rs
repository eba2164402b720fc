use axum::{
    extract::{Path, State},
    routing::patch,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::arret_controller::ArretController;
use crate::dto::arret_dto::UpdateArretScheduleRequest;
use crate::dto::ApiResponse;
use crate::models::{Arret, TenantContext};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_arret_router() -> Router<AppState> {
    Router::new().route("/:id/schedule", patch(update_arret_schedule))
}

async fn update_arret_schedule(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateArretScheduleRequest>,
) -> Result<Json<ApiResponse<Arret>>, AppError> {
    let controller = ArretController::new(&state);
    let response = controller.update_schedule(&tenant, id, request).await?;
    Ok(Json(response))
}
