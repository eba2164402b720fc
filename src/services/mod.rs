//! Services module
//!
//! Este módulo contiene la lógica de negocio del motor de planificación.
//! Los servicios reciben el almacén y el proveedor de rutas por inyección,
//! así los tests pueden sustituirlos.

pub mod arret_sync_service;
pub mod association_service;
pub mod circuit_service;
pub mod occurrence_service;
pub mod route_calculation_service;
pub mod schedule_service;

pub use arret_sync_service::{ArretRemoval, ArretSyncService};
pub use association_service::AssociationService;
pub use circuit_service::CircuitService;
pub use occurrence_service::OccurrenceService;
pub use route_calculation_service::{RouteCalculationService, RouteTotals};
pub use schedule_service::ScheduleService;
