use uuid::Uuid;
use validator::Validate;

use crate::dto::occurrence_dto::{
    GenerateOccurrencesRequest, GenerateOccurrencesResponse, ListOccurrencesQuery,
    OccurrenceResponse,
};
use crate::dto::trajet_dto::{CalculateTimesRequest, CalculateTimesResponse, ReorderArretsRequest};
use crate::dto::ApiResponse;
use crate::models::{Arret, TenantContext};
use crate::services::{OccurrenceService, RouteCalculationService, RouteTotals, ScheduleService};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{ensure_date_window, ensure_generation_window};

pub struct TrajetController {
    occurrences: OccurrenceService,
    routes: RouteCalculationService,
    schedule: ScheduleService,
}

impl TrajetController {
    pub fn new(state: &AppState) -> Self {
        Self {
            occurrences: OccurrenceService::new(state.store.clone()),
            routes: RouteCalculationService::new(state.store.clone(), state.routing.clone()),
            schedule: ScheduleService::new(state.store.clone()),
        }
    }

    pub async fn generate_occurrences(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        request: GenerateOccurrencesRequest,
    ) -> Result<ApiResponse<GenerateOccurrencesResponse>, AppError> {
        request.validate()?;
        ensure_generation_window(request.from_date, request.to_date)?;

        let inserted = self
            .occurrences
            .generate(tenant, trajet_id, request.from_date, request.to_date)
            .await?;

        Ok(ApiResponse::success_with_message(
            GenerateOccurrencesResponse { inserted },
            format!("{} occurrence(s) créée(s)", inserted),
        ))
    }

    pub async fn list_occurrences(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        query: ListOccurrencesQuery,
    ) -> Result<Vec<OccurrenceResponse>, AppError> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            ensure_date_window(from, to)?;
        }

        let occurrences = self
            .occurrences
            .list(tenant, trajet_id, query.from, query.to)
            .await?;

        Ok(occurrences.into_iter().map(OccurrenceResponse::from).collect())
    }

    pub async fn calculate_route(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
    ) -> Result<ApiResponse<RouteTotals>, AppError> {
        let totals = self.routes.calculate_route(tenant, trajet_id).await?;
        Ok(ApiResponse::success(totals))
    }

    pub async fn calculate_times(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        request: CalculateTimesRequest,
    ) -> Result<ApiResponse<CalculateTimesResponse>, AppError> {
        request.validate()?;

        let updated = self
            .schedule
            .calculate_times(tenant, trajet_id, request.wait_time_seconds)
            .await?;

        Ok(ApiResponse::success(CalculateTimesResponse { updated }))
    }

    pub async fn reorder_arrets(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        request: ReorderArretsRequest,
    ) -> Result<ApiResponse<Vec<Arret>>, AppError> {
        request.validate()?;

        let arrets = self
            .schedule
            .reorder_arrets(tenant, trajet_id, &request.arret_ids)
            .await?;

        Ok(ApiResponse::success_with_message(
            arrets,
            "Ordre des arrêts mis à jour".to_string(),
        ))
    }
}
