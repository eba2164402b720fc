//! Cliente del servicio de itinerarios (Géoplateforme IGN)
//!
//! Una llamada por par de arrets consecutivos. El trait `RoutingProvider` permite
//! sustituir el proveedor real por uno determinista en los tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::RoutingConfig;
use crate::utils::errors::AppError;

/// Restricción que excluye las autopistas cuando no se admiten peajes
pub const AVOID_TOLLS_CONSTRAINT: &str =
    r#"{"constraintType":"banned","key":"wayType","operator":"=","value":"autoroute"}"#;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("impossible de créer le client HTTP: {0}")]
    Client(String),

    #[error("échec de la requête d'itinéraire: {0}")]
    Request(#[from] reqwest::Error),

    #[error("le service d'itinéraire a répondu {status}: {body}")]
    Status { status: u16, body: String },

    #[error("réponse d'itinéraire invalide: {0}")]
    InvalidResponse(String),
}

impl From<RoutingError> for AppError {
    fn from(e: RoutingError) -> Self {
        AppError::ExternalApi(e.to_string())
    }
}

/// Tramo a calcular entre dos puntos [lon, lat]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRequest {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub avoid_tolls: bool,
}

/// Resultado de un tramo: metros, segundos y geometría opcional
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Option<Vec<[f64; 2]>>,
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route_segment(&self, request: SegmentRequest) -> Result<RouteSegment, RoutingError>;
}

#[derive(Debug, Deserialize)]
struct ItineraireResponse {
    distance: f64,
    duration: f64,
    geometry: Option<ItineraireGeometry>,
}

#[derive(Debug, Deserialize)]
struct ItineraireGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Cliente HTTP del servicio `itineraire`
pub struct IgnRoutingClient {
    client: Client,
    base_url: String,
    resource: String,
}

impl IgnRoutingClient {
    pub fn new(config: &RoutingConfig) -> Result<Self, RoutingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RoutingError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            resource: config.resource.clone(),
        })
    }
}

fn format_point(point: [f64; 2]) -> String {
    format!("{},{}", point[0], point[1])
}

/// Parámetros de consulta de un tramo
fn segment_query(resource: &str, request: &SegmentRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("resource", resource.to_string()),
        ("start", format_point(request.start)),
        ("end", format_point(request.end)),
        ("profile", "car".to_string()),
        ("optimization", "fastest".to_string()),
        ("geometryFormat", "geojson".to_string()),
        ("distanceUnit", "meter".to_string()),
        ("timeUnit", "second".to_string()),
    ];
    if request.avoid_tolls {
        query.push(("constraints", AVOID_TOLLS_CONSTRAINT.to_string()));
    }
    query
}

#[async_trait]
impl RoutingProvider for IgnRoutingClient {
    async fn route_segment(&self, request: SegmentRequest) -> Result<RouteSegment, RoutingError> {
        log::debug!(
            "🗺️ Itinéraire {} -> {}",
            format_point(request.start),
            format_point(request.end)
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&segment_query(&self.resource, &request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Service d'itinéraire: HTTP {}", status);
            return Err(RoutingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ItineraireResponse = response
            .json()
            .await
            .map_err(|e| RoutingError::InvalidResponse(e.to_string()))?;

        Ok(RouteSegment {
            distance_m: payload.distance,
            duration_s: payload.duration,
            geometry: payload.geometry.map(|g| g.coordinates),
        })
    }
}
