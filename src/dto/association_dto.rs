use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

// Request para asociar un usager a un circuit
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssociationRequest {
    pub usager_id: Uuid,
    pub circuit_id: Uuid,
    pub usager_address_id: Uuid,
}

// Request para cambiar la dirección de una asociación
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssociationRequest {
    pub usager_address_id: Uuid,
}
