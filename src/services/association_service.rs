//! Asociaciones usager-circuit
//!
//! Cada alta, modificación o baja dispara la sincronización de arrets de ambos
//! sentidos. Los días se copian desde la dirección elegida en el momento de la
//! operación.

use std::sync::Arc;
use uuid::Uuid;

use super::arret_sync_service::ArretSyncService;
use crate::models::{
    are_day_entries_equal, Direction, NewUsagerCircuit, TenantContext, UsagerAddress, UsagerCircuit,
};
use crate::repositories::Store;
use crate::utils::errors::{not_found_error, validation_failure, AppResult};

#[derive(Clone)]
pub struct AssociationService {
    store: Arc<dyn Store>,
    sync: ArretSyncService,
}

impl AssociationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            sync: ArretSyncService::new(store.clone()),
            store,
        }
    }

    async fn load_address(
        &self,
        tenant: &TenantContext,
        usager_id: Uuid,
        usager_address_id: Uuid,
    ) -> AppResult<UsagerAddress> {
        let address = self
            .store
            .find_usager_address(tenant, usager_address_id)
            .await?
            .ok_or_else(|| not_found_error("UsagerAddress", &usager_address_id))?;

        if address.usager_id != usager_id {
            return Err(validation_failure("Cette adresse n'appartient pas à l'usager"));
        }
        if !address.needs_circuit {
            return Err(validation_failure(
                "Le type de transport de cette adresse ne nécessite pas de circuit",
            ));
        }
        Ok(address)
    }

    async fn sync_both_directions(
        &self,
        tenant: &TenantContext,
        association: &UsagerCircuit,
    ) -> AppResult<()> {
        futures::try_join!(
            self.sync.sync_trajet_for_direction(
                tenant,
                association.circuit_id,
                Direction::Aller,
                &association.days_aller,
                association.usager_address_id,
            ),
            self.sync.sync_trajet_for_direction(
                tenant,
                association.circuit_id,
                Direction::Retour,
                &association.days_retour,
                association.usager_address_id,
            ),
        )?;
        Ok(())
    }

    pub async fn create(
        &self,
        tenant: &TenantContext,
        usager_id: Uuid,
        circuit_id: Uuid,
        usager_address_id: Uuid,
    ) -> AppResult<UsagerCircuit> {
        self.store
            .find_usager(tenant, usager_id)
            .await?
            .ok_or_else(|| not_found_error("Usager", &usager_id))?;
        self.store
            .find_circuit(tenant, circuit_id)
            .await?
            .ok_or_else(|| not_found_error("Circuit", &circuit_id))?;
        let address = self.load_address(tenant, usager_id, usager_address_id).await?;

        let association = self
            .store
            .create_association(
                tenant,
                NewUsagerCircuit {
                    usager_id,
                    circuit_id,
                    usager_address_id,
                    days_aller: address.days_aller,
                    days_retour: address.days_retour,
                },
            )
            .await?;

        self.sync_both_directions(tenant, &association).await?;
        log::info!("🔗 Usager {} associé au circuit {}", usager_id, circuit_id);
        Ok(association)
    }

    /// Cambia la dirección (o refresca los días) de una asociación.
    /// Si la dirección o los días cambian, los arrets de la antigua dirección se
    /// retiran del circuit antes de volver a sincronizar.
    pub async fn update(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        usager_address_id: Uuid,
    ) -> AppResult<UsagerCircuit> {
        let existing = self
            .store
            .find_association(tenant, id)
            .await?
            .ok_or_else(|| not_found_error("UsagerCircuit", &id))?;
        let address = self
            .load_address(tenant, existing.usager_id, usager_address_id)
            .await?;

        let unchanged = existing.usager_address_id == usager_address_id
            && are_day_entries_equal(&existing.days_aller, &address.days_aller)
            && are_day_entries_equal(&existing.days_retour, &address.days_retour);

        if !unchanged {
            let removal = self
                .sync
                .remove_usager_arrets_from_circuit(tenant, existing.circuit_id, existing.usager_address_id)
                .await?;
            log::debug!(
                "🔄 Ancienne adresse retirée: {} arrêt(s), {} trajet(s) supprimé(s)",
                removal.arrets_removed,
                removal.trajets_pruned
            );
        }

        let updated = self
            .store
            .update_association(
                tenant,
                id,
                NewUsagerCircuit {
                    usager_id: existing.usager_id,
                    circuit_id: existing.circuit_id,
                    usager_address_id,
                    days_aller: address.days_aller,
                    days_retour: address.days_retour,
                },
            )
            .await?
            .ok_or_else(|| not_found_error("UsagerCircuit", &id))?;

        self.sync_both_directions(tenant, &updated).await?;
        Ok(updated)
    }

    pub async fn delete(&self, tenant: &TenantContext, id: Uuid) -> AppResult<()> {
        let existing = self
            .store
            .find_association(tenant, id)
            .await?
            .ok_or_else(|| not_found_error("UsagerCircuit", &id))?;

        self.sync
            .remove_usager_arrets_from_circuit(tenant, existing.circuit_id, existing.usager_address_id)
            .await?;

        if !self.store.delete_association(tenant, id).await? {
            return Err(not_found_error("UsagerCircuit", &id));
        }
        log::info!("✂️ Association {} supprimée", id);
        Ok(())
    }
}
