use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::association_controller::AssociationController;
use crate::dto::association_dto::{CreateAssociationRequest, UpdateAssociationRequest};
use crate::dto::ApiResponse;
use crate::models::{TenantContext, UsagerCircuit};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_association_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_association))
        .route("/:id", put(update_association).delete(delete_association))
}

async fn create_association(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(request): Json<CreateAssociationRequest>,
) -> Result<Json<ApiResponse<UsagerCircuit>>, AppError> {
    let controller = AssociationController::new(&state);
    let response = controller.create(&tenant, request).await?;
    Ok(Json(response))
}

async fn update_association(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAssociationRequest>,
) -> Result<Json<ApiResponse<UsagerCircuit>>, AppError> {
    let controller = AssociationController::new(&state);
    let response = controller.update(&tenant, id, request).await?;
    Ok(Json(response))
}

async fn delete_association(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = AssociationController::new(&state);
    controller.delete(&tenant, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Association supprimée"
    })))
}
