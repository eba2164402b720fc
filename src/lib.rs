//! Motor de planificación de transporte escolar
//!
//! Trajets recurrentes por circuit, ocurrencias por fecha, sincronización de
//! arrets desde las asociaciones usager-circuit, cálculo de rutas y propagación
//! de horarios.

pub mod clients;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use middleware::cors_layer;
use state::AppState;

/// Construye el router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes::create_api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Endpoint de salud
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "school-transport",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
