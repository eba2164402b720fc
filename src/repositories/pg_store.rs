//! Almacén PostgreSQL
//!
//! Filas crudas de sqlx y su conversión a modelos de dominio. Las columnas JSONB
//! de días y recurrencia sólo se interpretan aquí, a través de `normalize_days`.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    normalize_optional_days, Arret, Circuit, Etablissement, LineString, Occurrence, Recurrence,
    Trajet, Usager, UsagerAddress, UsagerCircuit,
};
use crate::utils::errors::AppError;

/// Implementación de los repositorios sobre un pool de PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn corrupt(entity: &str, detail: String) -> AppError {
    AppError::Internal(format!("Invalid {} row: {}", entity, detail))
}

pub(crate) const CIRCUIT_COLUMNS: &str =
    "id, tenant_id, etablissement_id, name, is_active, operating_days, start_date, end_date";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CircuitRow {
    id: Uuid,
    tenant_id: Uuid,
    etablissement_id: Option<Uuid>,
    name: String,
    is_active: bool,
    operating_days: Option<Json<Value>>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl From<CircuitRow> for Circuit {
    fn from(row: CircuitRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            etablissement_id: row.etablissement_id,
            name: row.name,
            is_active: row.is_active,
            operating_days: normalize_optional_days(row.operating_days.as_ref().map(|j| &j.0)),
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

pub(crate) const ETABLISSEMENT_COLUMNS: &str = "id, tenant_id, name, address, latitude, longitude";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EtablissementRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<EtablissementRow> for Etablissement {
    fn from(row: EtablissementRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

pub(crate) const TRAJET_COLUMNS: &str = "id, tenant_id, circuit_id, name, direction, chauffeur_id, \
     vehicule_id, departure_time, recurrence, start_date, end_date, peages, total_distance_km, \
     total_duration_seconds, route_geometry, etat";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TrajetRow {
    id: Uuid,
    tenant_id: Uuid,
    circuit_id: Uuid,
    name: String,
    direction: String,
    chauffeur_id: Option<Uuid>,
    vehicule_id: Option<Uuid>,
    departure_time: Option<NaiveTime>,
    recurrence: Option<Json<Value>>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    peages: bool,
    total_distance_km: Option<Decimal>,
    total_duration_seconds: Option<i32>,
    route_geometry: Option<Json<Value>>,
    etat: Option<String>,
}

impl TryFrom<TrajetRow> for Trajet {
    type Error = AppError;

    fn try_from(row: TrajetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            circuit_id: row.circuit_id,
            name: row.name,
            direction: row.direction.parse().map_err(|e| corrupt("trajet", e))?,
            chauffeur_id: row.chauffeur_id,
            vehicule_id: row.vehicule_id,
            departure_time: row.departure_time,
            recurrence: row.recurrence.as_ref().and_then(|j| Recurrence::from_value(&j.0)),
            start_date: row.start_date,
            end_date: row.end_date,
            peages: row.peages,
            total_distance_km: row.total_distance_km,
            total_duration_seconds: row.total_duration_seconds,
            route_geometry: row
                .route_geometry
                .and_then(|j| serde_json::from_value::<LineString>(j.0).ok()),
            etat: row.etat,
        })
    }
}

pub(crate) const ARRET_COLUMNS: &str = "id, tenant_id, trajet_id, arret_type, usager_address_id, \
     etablissement_id, name, address, latitude, longitude, order_index, arrival_time, wait_time, \
     distance_km, duration_seconds, time_locked";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArretRow {
    id: Uuid,
    tenant_id: Uuid,
    trajet_id: Uuid,
    arret_type: String,
    usager_address_id: Option<Uuid>,
    etablissement_id: Option<Uuid>,
    name: String,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    order_index: i32,
    arrival_time: Option<NaiveTime>,
    wait_time: i32,
    distance_km: Option<Decimal>,
    duration_seconds: Option<i32>,
    time_locked: bool,
}

impl TryFrom<ArretRow> for Arret {
    type Error = AppError;

    fn try_from(row: ArretRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            trajet_id: row.trajet_id,
            arret_type: row.arret_type.parse().map_err(|e| corrupt("arret", e))?,
            usager_address_id: row.usager_address_id,
            etablissement_id: row.etablissement_id,
            name: row.name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            order_index: row.order_index,
            arrival_time: row.arrival_time,
            wait_time: row.wait_time,
            distance_km: row.distance_km,
            duration_seconds: row.duration_seconds,
            time_locked: row.time_locked,
        })
    }
}

pub(crate) const OCCURRENCE_COLUMNS: &str =
    "id, tenant_id, trajet_id, date, status, chauffeur_id, vehicule_id, departure_time, notes";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OccurrenceRow {
    id: Uuid,
    tenant_id: Uuid,
    trajet_id: Uuid,
    date: NaiveDate,
    status: String,
    chauffeur_id: Option<Uuid>,
    vehicule_id: Option<Uuid>,
    departure_time: Option<NaiveTime>,
    notes: Option<String>,
}

impl TryFrom<OccurrenceRow> for Occurrence {
    type Error = AppError;

    fn try_from(row: OccurrenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            trajet_id: row.trajet_id,
            date: row.date,
            status: row.status.parse().map_err(|e| corrupt("occurrence", e))?,
            chauffeur_id: row.chauffeur_id,
            vehicule_id: row.vehicule_id,
            departure_time: row.departure_time,
            notes: row.notes,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UsagerRow {
    id: Uuid,
    tenant_id: Uuid,
    first_name: String,
    last_name: String,
}

impl From<UsagerRow> for Usager {
    fn from(row: UsagerRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

pub(crate) const USAGER_ADDRESS_COLUMNS: &str = "id, tenant_id, usager_id, position, label, address, \
     latitude, longitude, transport_type, needs_circuit, days_aller, days_retour";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UsagerAddressRow {
    id: Uuid,
    tenant_id: Uuid,
    usager_id: Uuid,
    position: i16,
    label: Option<String>,
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    transport_type: Option<String>,
    needs_circuit: bool,
    days_aller: Option<Json<Value>>,
    days_retour: Option<Json<Value>>,
}

impl From<UsagerAddressRow> for UsagerAddress {
    fn from(row: UsagerAddressRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            usager_id: row.usager_id,
            position: row.position,
            label: row.label,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            transport_type: row.transport_type,
            needs_circuit: row.needs_circuit,
            days_aller: normalize_optional_days(row.days_aller.as_ref().map(|j| &j.0)),
            days_retour: normalize_optional_days(row.days_retour.as_ref().map(|j| &j.0)),
        }
    }
}

pub(crate) const USAGER_CIRCUIT_COLUMNS: &str =
    "id, tenant_id, usager_id, circuit_id, usager_address_id, days_aller, days_retour";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UsagerCircuitRow {
    id: Uuid,
    tenant_id: Uuid,
    usager_id: Uuid,
    circuit_id: Uuid,
    usager_address_id: Uuid,
    days_aller: Option<Json<Value>>,
    days_retour: Option<Json<Value>>,
}

impl From<UsagerCircuitRow> for UsagerCircuit {
    fn from(row: UsagerCircuitRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            usager_id: row.usager_id,
            circuit_id: row.circuit_id,
            usager_address_id: row.usager_address_id,
            days_aller: normalize_optional_days(row.days_aller.as_ref().map(|j| &j.0)),
            days_retour: normalize_optional_days(row.days_retour.as_ref().map(|j| &j.0)),
        }
    }
}
