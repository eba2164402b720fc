//! Datos de prueba compartidos por los tests de integración

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use school_transport::clients::{RouteSegment, RoutingError, RoutingProvider, SegmentRequest};
use school_transport::config::{EnvironmentConfig, RoutingConfig, StorageBackend};
use school_transport::create_router;
use school_transport::middleware::encode_tenant_token;
use school_transport::models::{
    Arret, ArretType, Circuit, DayEntry, Direction, Etablissement, Recurrence, TenantContext,
    Trajet, Usager, UsagerAddress,
};
use school_transport::repositories::MemoryStore;
use school_transport::state::AppState;

pub const JWT_SECRET: &str = "test-secret";

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap()
}

/// Proveedor de rutas determinista: un tramo por llamada, en orden
pub struct FakeRouting {
    segments: Vec<RouteSegment>,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<SegmentRequest>>,
}

impl FakeRouting {
    pub fn new(segments: Vec<RouteSegment>) -> Self {
        Self {
            segments,
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Tramos de (metros, segundos) con una geometría recta de dos puntos
    pub fn with_segments(values: &[(f64, f64)]) -> Self {
        Self::new(
            values
                .iter()
                .enumerate()
                .map(|(i, (distance_m, duration_s))| RouteSegment {
                    distance_m: *distance_m,
                    duration_s: *duration_s,
                    geometry: Some(vec![[i as f64, 0.0], [(i + 1) as f64, 0.0]]),
                })
                .collect(),
        )
    }

    /// La llamada número `call` (desde 1) responde con un error HTTP
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn requests(&self) -> Vec<SegmentRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoutingProvider for FakeRouting {
    async fn route_segment(&self, request: SegmentRequest) -> Result<RouteSegment, RoutingError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request);
            calls.len()
        };

        if self.fail_on_call == Some(call) {
            return Err(RoutingError::Status {
                status: 503,
                body: "service indisponible".to_string(),
            });
        }

        self.segments
            .get(call - 1)
            .cloned()
            .ok_or_else(|| RoutingError::InvalidResponse(format!("tronçon {} inattendu", call)))
    }
}

/// Tenant con un establecimiento, un circuit y un usager con una dirección
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub tenant: TenantContext,
    pub etablissement: Etablissement,
    pub circuit: Circuit,
    pub usager: Usager,
    pub address: UsagerAddress,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let tenant = TenantContext::with_user(Uuid::new_v4(), Uuid::new_v4());

        let etablissement = Etablissement {
            id: Uuid::new_v4(),
            tenant_id: tenant.tenant_id,
            name: "École Jules Ferry".to_string(),
            address: Some("1 place de la Mairie".to_string()),
            latitude: Some(48.85),
            longitude: Some(2.35),
        };
        let circuit = Circuit {
            id: Uuid::new_v4(),
            tenant_id: tenant.tenant_id,
            etablissement_id: Some(etablissement.id),
            name: "Circuit Nord".to_string(),
            is_active: true,
            operating_days: vec![],
            start_date: Some(date("2024-01-01")),
            end_date: None,
        };
        let usager = Usager {
            id: Uuid::new_v4(),
            tenant_id: tenant.tenant_id,
            first_name: "Léa".to_string(),
            last_name: "Martin".to_string(),
        };

        store.insert_etablissement(etablissement.clone()).await;
        store.insert_circuit(circuit.clone()).await;
        store.insert_usager(usager.clone()).await;

        let mut fixture = Self {
            store,
            tenant,
            etablissement,
            circuit,
            usager: usager.clone(),
            address: blank_address(&usager),
        };
        fixture.address = fixture
            .add_address(
                &usager,
                vec![DayEntry::every(1), DayEntry::every(2), DayEntry::every(4)],
                vec![DayEntry::every(3)],
            )
            .await;
        fixture
    }

    pub async fn add_usager(&self, first_name: &str) -> Usager {
        let usager = Usager {
            id: Uuid::new_v4(),
            tenant_id: self.tenant.tenant_id,
            first_name: first_name.to_string(),
            last_name: "Durand".to_string(),
        };
        self.store.insert_usager(usager.clone()).await;
        usager
    }

    pub async fn add_address(
        &self,
        usager: &Usager,
        days_aller: Vec<DayEntry>,
        days_retour: Vec<DayEntry>,
    ) -> UsagerAddress {
        let address = UsagerAddress {
            days_aller,
            days_retour,
            ..blank_address(usager)
        };
        self.store.insert_usager_address(address.clone()).await;
        address
    }

    /// Trajet sin fechas propias, con la recurrencia indicada
    pub async fn add_trajet(&self, direction: Direction, days: Vec<DayEntry>) -> Trajet {
        let trajet = Trajet {
            id: Uuid::new_v4(),
            tenant_id: self.tenant.tenant_id,
            circuit_id: self.circuit.id,
            name: "Trajet test".to_string(),
            direction,
            chauffeur_id: None,
            vehicule_id: None,
            departure_time: None,
            recurrence: Some(Recurrence::weekly(days)),
            start_date: None,
            end_date: None,
            peages: false,
            total_distance_km: None,
            total_duration_seconds: None,
            route_geometry: None,
            etat: None,
        };
        self.store.insert_trajet(trajet.clone()).await;
        trajet
    }

    /// Arret de usager sin persistir, para ajustar campos antes de insertarlo
    pub fn new_arret(&self, trajet: &Trajet, order_index: i32, coordinates: Option<[f64; 2]>) -> Arret {
        Arret {
            id: Uuid::new_v4(),
            tenant_id: self.tenant.tenant_id,
            trajet_id: trajet.id,
            arret_type: ArretType::Usager,
            usager_address_id: None,
            etablissement_id: None,
            name: format!("Arrêt {}", order_index),
            address: None,
            latitude: coordinates.map(|c| c[1]),
            longitude: coordinates.map(|c| c[0]),
            order_index,
            arrival_time: None,
            wait_time: 0,
            distance_km: None,
            duration_seconds: None,
            time_locked: false,
        }
    }

    pub async fn add_arret(&self, trajet: &Trajet, order_index: i32, coordinates: Option<[f64; 2]>) -> Arret {
        let arret = self.new_arret(trajet, order_index, coordinates);
        self.store.insert_arret_row(arret.clone()).await;
        arret
    }

    pub fn token(&self) -> String {
        encode_tenant_token(&self.tenant, JWT_SECRET, 3600).unwrap()
    }

    pub fn app(&self, routing: Arc<dyn RoutingProvider>) -> Router {
        create_router(AppState::new(self.store.clone(), routing, test_config()))
    }
}

fn blank_address(usager: &Usager) -> UsagerAddress {
    UsagerAddress {
        id: Uuid::new_v4(),
        tenant_id: usager.tenant_id,
        usager_id: usager.id,
        position: 1,
        label: Some("Domicile".to_string()),
        address: "12 rue des Lilas".to_string(),
        latitude: Some(48.86),
        longitude: Some(2.30),
        transport_type: Some("circuit".to_string()),
        needs_circuit: true,
        days_aller: vec![],
        days_retour: vec![],
    }
}

pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        log_level: "debug".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        cors_origins: vec![],
        storage_backend: StorageBackend::Memory,
        database_url: None,
        database_max_connections: 1,
        routing: RoutingConfig::default(),
    }
}
