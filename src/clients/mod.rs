//! Clients - HTTP Clients for External APIs
//!
//! Proveedor de rutas externo invocado por el motor de cálculo de rutas.

pub mod routing_client;

pub use routing_client::{IgnRoutingClient, RouteSegment, RoutingError, RoutingProvider, SegmentRequest};
