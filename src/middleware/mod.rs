//! Middleware del sistema
//!
//! Extracción del tenant desde el JWT y configuración de CORS.

pub mod cors;
pub mod tenant;

pub use cors::cors_layer;
pub use tenant::{decode_tenant_token, encode_tenant_token, Claims};
