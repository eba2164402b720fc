//! Borrado de circuits

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{CircuitDeletion, TenantContext};
use crate::repositories::Store;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct CircuitService {
    store: Arc<dyn Store>,
}

impl CircuitService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Borra el circuit y sus trajets y elimina sus asociaciones, de forma atómica
    pub async fn delete_circuit(&self, tenant: &TenantContext, id: Uuid) -> AppResult<CircuitDeletion> {
        self.store
            .find_circuit(tenant, id)
            .await?
            .ok_or_else(|| not_found_error("Circuit", &id))?;

        let deletion = self.store.delete_circuit_cascade(tenant, id).await?;
        log::info!(
            "🗑️ Circuit {} supprimé: {} trajet(s), {} association(s)",
            id,
            deletion.trajets_deleted,
            deletion.associations_removed
        );
        Ok(deletion)
    }
}
