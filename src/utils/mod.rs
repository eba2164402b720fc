//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! y formato de horarios.

pub mod errors;
pub mod time_format;
pub mod validation;
