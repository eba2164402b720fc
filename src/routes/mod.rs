use axum::Router;

use crate::state::AppState;

pub mod arret_routes;
pub mod association_routes;
pub mod circuit_routes;
pub mod occurrence_routes;
pub mod trajet_routes;

/// Router de `/api`
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/trajets", trajet_routes::create_trajet_router())
        .nest("/arrets", arret_routes::create_arret_router())
        .nest("/occurrences", occurrence_routes::create_occurrence_router())
        .nest("/usager-circuits", association_routes::create_association_router())
        .nest("/circuits", circuit_routes::create_circuit_router())
}
