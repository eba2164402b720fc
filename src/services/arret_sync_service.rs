//! Sincronización de arrets y trajets
//!
//! Mantiene los trajets de un circuit coherentes con los patrones de días de cada
//! asociación usager-circuit: busca o crea el trajet con el mismo patrón y asegura
//! un único arret por dirección de usager.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    are_day_entries_equal, format_days_short, sorted_days, Arret, ArretType, DayEntry, Direction,
    NewArret, NewTrajet, Recurrence, TenantContext,
};
use crate::repositories::Store;
use crate::utils::errors::{not_found_error, AppResult};

/// Resultado de retirar un usager de un circuit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArretRemoval {
    pub arrets_removed: u64,
    pub trajets_pruned: u64,
}

/// Nombre automático de un trajet: "Aller - L M Me"
pub fn trajet_name(direction: Direction, days: &[DayEntry]) -> String {
    format!("{} - {}", direction.label(), format_days_short(days))
}

#[derive(Clone)]
pub struct ArretSyncService {
    store: Arc<dyn Store>,
}

impl ArretSyncService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Asegura que el usager tiene un arret en el trajet del circuit cuyo patrón de
    /// días coincide con `days`, creando el trajet si hace falta.
    ///
    /// Devuelve el id del trajet usado, o `None` si `days` está vacío.
    pub async fn sync_trajet_for_direction(
        &self,
        tenant: &TenantContext,
        circuit_id: Uuid,
        direction: Direction,
        days: &[DayEntry],
        usager_address_id: Uuid,
    ) -> AppResult<Option<Uuid>> {
        if days.is_empty() {
            return Ok(None);
        }

        let circuit = self
            .store
            .find_circuit(tenant, circuit_id)
            .await?
            .ok_or_else(|| not_found_error("Circuit", &circuit_id))?;

        let trajets = self
            .store
            .list_trajets(tenant, circuit_id, Some(direction))
            .await?;

        let existing = trajets
            .into_iter()
            .find(|trajet| are_day_entries_equal(trajet.effective_days(), days));

        let trajet_id = match existing {
            Some(trajet) => trajet.id,
            None => {
                let trajet = self
                    .store
                    .create_trajet(
                        tenant,
                        NewTrajet {
                            circuit_id,
                            name: trajet_name(direction, days),
                            direction,
                            recurrence: Recurrence::weekly(sorted_days(days)),
                        },
                    )
                    .await?;
                log::info!("🆕 Trajet '{}' créé sur le circuit {}", trajet.name, circuit_id);

                if let Some(etablissement_id) = circuit.etablissement_id {
                    match self.store.find_etablissement(tenant, etablissement_id).await? {
                        Some(etablissement) => {
                            self.store
                                .insert_arret(
                                    tenant,
                                    NewArret {
                                        trajet_id: trajet.id,
                                        arret_type: ArretType::Etablissement,
                                        usager_address_id: None,
                                        etablissement_id: Some(etablissement.id),
                                        name: etablissement.name,
                                        address: etablissement.address,
                                        latitude: etablissement.latitude,
                                        longitude: etablissement.longitude,
                                        order_index: 0,
                                    },
                                )
                                .await?;
                        }
                        None => log::warn!(
                            "⚠️ Établissement {} introuvable, trajet créé sans arrêt établissement",
                            etablissement_id
                        ),
                    }
                }

                trajet.id
            }
        };

        self.add_usager_arret(tenant, trajet_id, usager_address_id)
            .await?;

        Ok(Some(trajet_id))
    }

    /// Añade el arret del usager al final del trajet.
    /// No hace nada si ya existe un arret para esa dirección.
    pub async fn add_usager_arret(
        &self,
        tenant: &TenantContext,
        trajet_id: Uuid,
        usager_address_id: Uuid,
    ) -> AppResult<Option<Arret>> {
        let address = self
            .store
            .find_usager_address(tenant, usager_address_id)
            .await?
            .ok_or_else(|| not_found_error("UsagerAddress", &usager_address_id))?;

        let usager = self
            .store
            .find_usager(tenant, address.usager_id)
            .await?
            .ok_or_else(|| not_found_error("Usager", &address.usager_id))?;

        let arrets = self.store.list_arrets(tenant, trajet_id).await?;
        if arrets
            .iter()
            .any(|arret| arret.usager_address_id == Some(usager_address_id))
        {
            return Ok(None);
        }

        let order_index = arrets
            .iter()
            .map(|arret| arret.order_index)
            .max()
            .map_or(0, |max| max + 1);

        let created = self
            .store
            .insert_arret(
                tenant,
                NewArret {
                    trajet_id,
                    arret_type: ArretType::Usager,
                    usager_address_id: Some(usager_address_id),
                    etablissement_id: None,
                    name: usager.display_name(),
                    address: Some(address.address),
                    latitude: address.latitude,
                    longitude: address.longitude,
                    order_index,
                },
            )
            .await?;

        if created.is_some() {
            log::debug!("📍 Arrêt ajouté pour {} (ordre {})", usager.display_name(), order_index);
        }
        Ok(created)
    }

    /// Retira los arrets de una dirección de usager en todos los trajets del circuit.
    /// Un trajet que pierde su último arret de usager queda borrado.
    pub async fn remove_usager_arrets_from_circuit(
        &self,
        tenant: &TenantContext,
        circuit_id: Uuid,
        usager_address_id: Uuid,
    ) -> AppResult<ArretRemoval> {
        let trajets = self.store.list_trajets(tenant, circuit_id, None).await?;

        let mut removal = ArretRemoval::default();
        for trajet in trajets {
            let removed = self
                .store
                .soft_delete_usager_arrets(tenant, trajet.id, usager_address_id)
                .await?;
            if removed == 0 {
                continue;
            }
            removal.arrets_removed += removed;

            if self.store.count_usager_arrets(tenant, trajet.id).await? == 0 {
                self.store.soft_delete_trajet(tenant, trajet.id).await?;
                removal.trajets_pruned += 1;
                log::info!("🧹 Trajet '{}' supprimé: plus aucun usager", trajet.name);
            }
        }

        Ok(removal)
    }
}
