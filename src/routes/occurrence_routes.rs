use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::occurrence_controller::OccurrenceController;
use crate::dto::occurrence_dto::{OccurrenceResponse, UpdateOccurrenceRequest};
use crate::dto::ApiResponse;
use crate::models::TenantContext;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_occurrence_router() -> Router<AppState> {
    Router::new()
        .route("/:id", put(update_occurrence))
        .route("/:id/cancel", post(cancel_occurrence))
}

async fn update_occurrence(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOccurrenceRequest>,
) -> Result<Json<ApiResponse<OccurrenceResponse>>, AppError> {
    let controller = OccurrenceController::new(&state);
    let response = controller.update(&tenant, id, request).await?;
    Ok(Json(response))
}

async fn cancel_occurrence(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OccurrenceResponse>>, AppError> {
    let controller = OccurrenceController::new(&state);
    let response = controller.cancel(&tenant, id).await?;
    Ok(Json(response))
}
