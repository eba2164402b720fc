use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::trajet_controller::TrajetController;
use crate::dto::occurrence_dto::{
    GenerateOccurrencesRequest, GenerateOccurrencesResponse, ListOccurrencesQuery,
    OccurrenceResponse,
};
use crate::dto::trajet_dto::{CalculateTimesRequest, CalculateTimesResponse, ReorderArretsRequest};
use crate::dto::ApiResponse;
use crate::models::{Arret, TenantContext};
use crate::services::RouteTotals;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trajet_router() -> Router<AppState> {
    Router::new()
        .route("/:id/occurrences/generate", post(generate_occurrences))
        .route("/:id/occurrences", get(list_occurrences))
        .route("/:id/route/calculate", post(calculate_route))
        .route("/:id/times/calculate", post(calculate_times))
        .route("/:id/arrets/order", put(reorder_arrets))
}

async fn generate_occurrences(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<GenerateOccurrencesRequest>,
) -> Result<Json<ApiResponse<GenerateOccurrencesResponse>>, AppError> {
    let controller = TrajetController::new(&state);
    let response = controller.generate_occurrences(&tenant, id, request).await?;
    Ok(Json(response))
}

async fn list_occurrences(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ListOccurrencesQuery>,
) -> Result<Json<Vec<OccurrenceResponse>>, AppError> {
    let controller = TrajetController::new(&state);
    let response = controller.list_occurrences(&tenant, id, query).await?;
    Ok(Json(response))
}

async fn calculate_route(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RouteTotals>>, AppError> {
    let controller = TrajetController::new(&state);
    let response = controller.calculate_route(&tenant, id).await?;
    Ok(Json(response))
}

async fn calculate_times(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    request: Option<Json<CalculateTimesRequest>>,
) -> Result<Json<ApiResponse<CalculateTimesResponse>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = TrajetController::new(&state);
    let response = controller.calculate_times(&tenant, id, request).await?;
    Ok(Json(response))
}

async fn reorder_arrets(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ReorderArretsRequest>,
) -> Result<Json<ApiResponse<Vec<Arret>>>, AppError> {
    let controller = TrajetController::new(&state);
    let response = controller.reorder_arrets(&tenant, id, request).await?;
    Ok(Json(response))
}
