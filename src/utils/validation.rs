//! Utilidades de validación
//!
//! Funciones helper usadas por los DTOs (`#[validate(custom = ...)]`)
//! y por los servicios para comprobar ventanas de fechas.

use chrono::NaiveDate;
use uuid::Uuid;
use validator::ValidationError;

use super::errors::{validation_failure, AppError};

/// Validar que una lista de ids no tenga duplicados
pub fn validate_unique_ids(ids: &[Uuid]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            let mut error = ValidationError::new("unique");
            error.add_param("duplicate".into(), &id.to_string());
            return Err(error);
        }
    }
    Ok(())
}

/// Comprobar que una ventana de fechas es coherente
pub fn ensure_date_window(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if from > to {
        return Err(validation_failure(
            "La date de début doit être antérieure ou égale à la date de fin",
        ));
    }
    Ok(())
}

/// Máximo de días, inclusivos, que puede cubrir una generación de ocurrencias
pub const MAX_GENERATION_WINDOW_DAYS: i64 = 366;

/// Ventana coherente y de como mucho `MAX_GENERATION_WINDOW_DAYS` días
pub fn ensure_generation_window(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    ensure_date_window(from, to)?;
    if (to - from).num_days() + 1 > MAX_GENERATION_WINDOW_DAYS {
        return Err(AppError::ValidationFailure(format!(
            "La période de génération ne peut pas dépasser {} jours",
            MAX_GENERATION_WINDOW_DAYS
        )));
    }
    Ok(())
}
