//! DTOs de la API
//!
//! Cuerpos de petición (validados con `validator`) y de respuesta, en camelCase.

pub mod api_response;
pub mod arret_dto;
pub mod association_dto;
pub mod occurrence_dto;
pub mod trajet_dto;

pub use api_response::ApiResponse;
