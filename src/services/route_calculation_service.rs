//! Cálculo de rutas
//!
//! Recorre los arrets de un trajet en orden, pide cada tramo al proveedor de
//! itinerarios de uno en uno y aplica el resultado completo en una sola escritura
//! atómica. Un fallo en cualquier tramo aborta el cálculo sin persistir nada.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::clients::{RoutingProvider, SegmentRequest};
use crate::models::{ArretSegment, LineString, RouteComputation, TenantContext};
use crate::repositories::Store;
use crate::utils::errors::{not_found_error, validation_failure, AppError, AppResult};

/// Máximo de puntos guardados en la geometría del trajet
pub const MAX_GEOMETRY_POINTS: usize = 1000;

const KM_DECIMALS: u32 = 3;

/// Totales devueltos al llamador
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTotals {
    pub total_distance_km: Decimal,
    pub total_duration_seconds: i32,
}

/// Redondeo a 3 decimales, los puntos medios se alejan de cero (0.0625 -> 0.063)
pub fn round_km(km: Decimal) -> Decimal {
    km.round_dp_with_strategy(KM_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Metros a km con 3 decimales
pub fn meters_to_km(meters: f64) -> Decimal {
    round_km(Decimal::from_f64_retain(meters / 1000.0).unwrap_or_default())
}

/// Concatena las geometrías de los tramos quitando el punto frontera repetido.
/// Los tramos sin geometría se omiten.
pub fn combine_segments(segments: &[Option<Vec<[f64; 2]>>]) -> Vec<[f64; 2]> {
    let mut combined: Vec<[f64; 2]> = Vec::new();
    for coordinates in segments.iter().flatten() {
        if combined.is_empty() {
            combined.extend_from_slice(coordinates);
        } else {
            combined.extend(coordinates.iter().skip(1).copied());
        }
    }
    combined
}

/// Submuestreo con paso fijo `ceil(len / max_points)`, conservando siempre el último punto
pub fn simplify_geometry(coordinates: Vec<[f64; 2]>, max_points: usize) -> Vec<[f64; 2]> {
    if coordinates.len() <= max_points || max_points == 0 {
        return coordinates;
    }

    let stride = coordinates.len().div_ceil(max_points);
    let last = coordinates[coordinates.len() - 1];
    let last_index = coordinates.len() - 1;

    let mut simplified: Vec<[f64; 2]> = coordinates.into_iter().step_by(stride).collect();
    if last_index % stride != 0 {
        simplified.push(last);
    }
    simplified
}

#[derive(Clone)]
pub struct RouteCalculationService {
    store: Arc<dyn Store>,
    routing: Arc<dyn RoutingProvider>,
}

impl RouteCalculationService {
    pub fn new(store: Arc<dyn Store>, routing: Arc<dyn RoutingProvider>) -> Self {
        Self { store, routing }
    }

    pub async fn calculate_route(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
    ) -> AppResult<RouteTotals> {
        let trajet = self
            .store
            .find_trajet(tenant, trajet_id)
            .await?
            .ok_or_else(|| not_found_error("Trajet", &trajet_id))?;

        let arrets = self.store.list_arrets(tenant, trajet_id).await?;
        if arrets.len() < 2 {
            return Err(validation_failure(
                "Il faut au moins 2 arrêts pour calculer un trajet",
            ));
        }

        let points = arrets
            .iter()
            .map(|arret| {
                arret.coordinates().ok_or_else(|| {
                    AppError::ValidationFailure(format!(
                        "Coordonnées manquantes pour l'arrêt « {} »",
                        arret.name
                    ))
                })
            })
            .collect::<AppResult<Vec<[f64; 2]>>>()?;

        log::info!(
            "🚗 Calcul d'itinéraire du trajet '{}' ({} arrêts, péages: {})",
            trajet.name,
            arrets.len(),
            trajet.peages
        );

        let mut segments = vec![ArretSegment {
            arret_id: arrets[0].id,
            distance_km: Decimal::ZERO,
            duration_seconds: 0,
        }];
        let mut geometries = Vec::with_capacity(arrets.len() - 1);
        let mut total_distance_km = Decimal::ZERO;
        let mut total_duration_seconds: i32 = 0;

        // Secuencial: el proveedor limita el número de peticiones
        for (index, pair) in points.windows(2).enumerate() {
            let segment = self
                .routing
                .route_segment(SegmentRequest {
                    start: pair[0],
                    end: pair[1],
                    avoid_tolls: !trajet.peages,
                })
                .await
                .map_err(|e| {
                    log::error!("❌ Tronçon {} du trajet {} en échec: {}", index + 1, trajet_id, e);
                    AppError::from(e)
                })?;

            let distance_km = meters_to_km(segment.distance_m);
            let duration_seconds = segment.duration_s.round() as i32;
            total_distance_km += distance_km;
            total_duration_seconds += duration_seconds;

            segments.push(ArretSegment {
                arret_id: arrets[index + 1].id,
                distance_km,
                duration_seconds,
            });
            geometries.push(segment.geometry);
        }

        let simplified = simplify_geometry(combine_segments(&geometries), MAX_GEOMETRY_POINTS);
        let route_geometry = (simplified.len() >= 2).then(|| LineString::new(simplified));

        let computation = RouteComputation {
            segments,
            total_distance_km: round_km(total_distance_km),
            total_duration_seconds,
            route_geometry,
        };

        self.store
            .apply_route_computation(tenant, trajet_id, &computation)
            .await?;

        log::info!(
            "✅ Trajet {}: {} km, {} s",
            trajet_id,
            computation.total_distance_km,
            computation.total_duration_seconds
        );

        Ok(RouteTotals {
            total_distance_km: computation.total_distance_km,
            total_duration_seconds: computation.total_duration_seconds,
        })
    }
}
