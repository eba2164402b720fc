//! Tests de integración del motor: sincronización de arrets, ocurrencias,
//! cálculo de rutas y propagación de horarios sobre el almacén en memoria.

mod common;

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use common::{date, time, FakeRouting, Fixture};
use school_transport::models::{
    ArretType, DayEntry, Direction, OccurrenceOverrides, OccurrenceStatus, Parity,
};
use school_transport::repositories::{
    ArretRepository, OccurrenceRepository, TrajetRepository, UsagerRepository,
};
use school_transport::services::{
    ArretSyncService, AssociationService, CircuitService, OccurrenceService,
    RouteCalculationService, ScheduleService,
};
use school_transport::utils::errors::AppError;

// ---- Asociaciones y sincronización ----

#[tokio::test]
async fn test_association_creates_one_trajet_per_direction() {
    let fixture = Fixture::new().await;
    let service = AssociationService::new(fixture.store.clone());

    let association = service
        .create(&fixture.tenant, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap();
    assert_eq!(association.days_aller, fixture.address.days_aller);

    let aller = fixture
        .store
        .list_trajets(&fixture.tenant, fixture.circuit.id, Some(Direction::Aller))
        .await
        .unwrap();
    assert_eq!(aller.len(), 1);
    assert_eq!(aller[0].name, "Aller - L M J");

    let arrets = fixture.store.list_arrets(&fixture.tenant, aller[0].id).await.unwrap();
    assert_eq!(arrets.len(), 2);
    assert_eq!(arrets[0].arret_type, ArretType::Etablissement);
    assert_eq!(arrets[1].usager_address_id, Some(fixture.address.id));
    assert_eq!(arrets[1].order_index, 1);

    let retour = fixture
        .store
        .list_trajets(&fixture.tenant, fixture.circuit.id, Some(Direction::Retour))
        .await
        .unwrap();
    assert_eq!(retour.len(), 1);
    assert_eq!(retour[0].name, "Retour - Me");
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    let fixture = Fixture::new().await;
    let sync = ArretSyncService::new(fixture.store.clone());
    let days = fixture.address.days_aller.clone();

    let first = sync
        .sync_trajet_for_direction(&fixture.tenant, fixture.circuit.id, Direction::Aller, &days, fixture.address.id)
        .await
        .unwrap();
    let second = sync
        .sync_trajet_for_direction(&fixture.tenant, fixture.circuit.id, Direction::Aller, &days, fixture.address.id)
        .await
        .unwrap();

    assert!(first.is_some());
    assert_eq!(first, second);

    let trajet_id = first.unwrap();
    let usager_arrets: Vec<_> = fixture
        .store
        .list_arrets(&fixture.tenant, trajet_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.usager_address_id == Some(fixture.address.id))
        .collect();
    assert_eq!(usager_arrets.len(), 1);
}

#[tokio::test]
async fn test_sync_reuses_trajet_with_same_days_in_other_order() {
    let fixture = Fixture::new().await;
    let sync = ArretSyncService::new(fixture.store.clone());
    let other = fixture.add_usager("Hugo").await;
    let other_address = fixture
        .add_address(
            &other,
            vec![DayEntry::every(4), DayEntry::every(1), DayEntry::every(2)],
            vec![],
        )
        .await;

    let first = sync
        .sync_trajet_for_direction(
            &fixture.tenant,
            fixture.circuit.id,
            Direction::Aller,
            &fixture.address.days_aller,
            fixture.address.id,
        )
        .await
        .unwrap();
    let second = sync
        .sync_trajet_for_direction(
            &fixture.tenant,
            fixture.circuit.id,
            Direction::Aller,
            &other_address.days_aller,
            other_address.id,
        )
        .await
        .unwrap();

    assert_eq!(first, second);
    let arrets = fixture.store.list_arrets(&fixture.tenant, first.unwrap()).await.unwrap();
    assert_eq!(arrets.len(), 3);
    assert_eq!(arrets[2].order_index, 2);
}

#[tokio::test]
async fn test_sync_with_empty_days_does_nothing() {
    let fixture = Fixture::new().await;
    let sync = ArretSyncService::new(fixture.store.clone());

    let result = sync
        .sync_trajet_for_direction(&fixture.tenant, fixture.circuit.id, Direction::Retour, &[], fixture.address.id)
        .await
        .unwrap();

    assert_eq!(result, None);
    let trajets = fixture
        .store
        .list_trajets(&fixture.tenant, fixture.circuit.id, None)
        .await
        .unwrap();
    assert!(trajets.is_empty());
}

#[tokio::test]
async fn test_delete_association_prunes_empty_trajets() {
    let fixture = Fixture::new().await;
    let service = AssociationService::new(fixture.store.clone());

    let association = service
        .create(&fixture.tenant, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap();
    let trajets = fixture
        .store
        .list_trajets(&fixture.tenant, fixture.circuit.id, None)
        .await
        .unwrap();
    assert_eq!(trajets.len(), 2);

    service.delete(&fixture.tenant, association.id).await.unwrap();

    for trajet in &trajets {
        assert!(fixture.store.is_trajet_deleted(trajet.id).await);
    }
    assert_eq!(fixture.store.association_count().await, 0);
}

#[tokio::test]
async fn test_delete_association_keeps_trajet_used_by_others() {
    let fixture = Fixture::new().await;
    let service = AssociationService::new(fixture.store.clone());
    let other = fixture.add_usager("Hugo").await;
    let other_address = fixture
        .add_address(&other, fixture.address.days_aller.clone(), vec![])
        .await;

    let association = service
        .create(&fixture.tenant, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap();
    service
        .create(&fixture.tenant, other.id, fixture.circuit.id, other_address.id)
        .await
        .unwrap();

    service.delete(&fixture.tenant, association.id).await.unwrap();

    let aller = fixture
        .store
        .list_trajets(&fixture.tenant, fixture.circuit.id, Some(Direction::Aller))
        .await
        .unwrap();
    assert_eq!(aller.len(), 1);
    let arrets = fixture.store.list_arrets(&fixture.tenant, aller[0].id).await.unwrap();
    assert!(arrets.iter().all(|a| a.usager_address_id != Some(fixture.address.id)));
    assert!(arrets.iter().any(|a| a.usager_address_id == Some(other_address.id)));

    // el retour solo tenía al primer usager
    let retour = fixture
        .store
        .list_trajets(&fixture.tenant, fixture.circuit.id, Some(Direction::Retour))
        .await
        .unwrap();
    assert!(retour.is_empty());
}

#[tokio::test]
async fn test_update_association_moves_stops_to_new_address() {
    let fixture = Fixture::new().await;
    let service = AssociationService::new(fixture.store.clone());
    let new_address = fixture
        .add_address(&fixture.usager, vec![DayEntry::every(5)], vec![])
        .await;

    let association = service
        .create(&fixture.tenant, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap();
    let updated = service
        .update(&fixture.tenant, association.id, new_address.id)
        .await
        .unwrap();

    assert_eq!(updated.usager_address_id, new_address.id);
    assert_eq!(updated.days_aller, vec![DayEntry::every(5)]);
    assert!(updated.days_retour.is_empty());

    let trajets = fixture
        .store
        .list_trajets(&fixture.tenant, fixture.circuit.id, None)
        .await
        .unwrap();
    assert_eq!(trajets.len(), 1);
    assert_eq!(trajets[0].name, "Aller - V");
}

#[tokio::test]
async fn test_duplicate_association_is_a_conflict() {
    let fixture = Fixture::new().await;
    let service = AssociationService::new(fixture.store.clone());

    service
        .create(&fixture.tenant, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap();
    let err = service
        .create(&fixture.tenant, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(fixture.store.association_count().await, 1);
}

#[tokio::test]
async fn test_association_rejects_address_of_other_usager() {
    let fixture = Fixture::new().await;
    let service = AssociationService::new(fixture.store.clone());
    let other = fixture.add_usager("Hugo").await;

    let err = service
        .create(&fixture.tenant, other.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ValidationFailure(_)));
    assert_eq!(fixture.store.association_count().await, 0);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let fixture = Fixture::new().await;
    let service = AssociationService::new(fixture.store.clone());
    let intruder = school_transport::models::TenantContext::new(Uuid::new_v4());

    let err = service
        .create(&intruder, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

// ---- Circuits ----

#[tokio::test]
async fn test_delete_circuit_cascades() {
    let fixture = Fixture::new().await;
    AssociationService::new(fixture.store.clone())
        .create(&fixture.tenant, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap();

    let deletion = CircuitService::new(fixture.store.clone())
        .delete_circuit(&fixture.tenant, fixture.circuit.id)
        .await
        .unwrap();

    assert_eq!(deletion.trajets_deleted, 2);
    assert_eq!(deletion.associations_removed, 1);
    assert!(fixture.store.is_circuit_deleted(fixture.circuit.id).await);
    assert_eq!(fixture.store.association_count().await, 0);
}

#[tokio::test]
async fn test_delete_unknown_circuit_is_not_found() {
    let fixture = Fixture::new().await;
    let err = CircuitService::new(fixture.store.clone())
        .delete_circuit(&fixture.tenant, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ---- Ocurrencias ----

#[tokio::test]
async fn test_generate_occurrences_is_idempotent() {
    let fixture = Fixture::new().await;
    let trajet = fixture
        .add_trajet(Direction::Aller, vec![DayEntry::every(1), DayEntry::every(3)])
        .await;
    let service = OccurrenceService::new(fixture.store.clone());

    let inserted = service
        .generate(&fixture.tenant, trajet.id, date("2024-01-01"), date("2024-01-10"))
        .await
        .unwrap();
    assert_eq!(inserted, 4);

    let again = service
        .generate(&fixture.tenant, trajet.id, date("2024-01-01"), date("2024-01-10"))
        .await
        .unwrap();
    assert_eq!(again, 0);

    let dates: Vec<_> = service
        .list(&fixture.tenant, trajet.id, None, None)
        .await
        .unwrap()
        .into_iter()
        .map(|resolved| resolved.occurrence.date)
        .collect();
    assert_eq!(
        dates,
        vec![date("2024-01-01"), date("2024-01-03"), date("2024-01-08"), date("2024-01-10")]
    );
}

#[tokio::test]
async fn test_generate_respects_parity() {
    let fixture = Fixture::new().await;
    // 2024-01-08 es semana ISO 2
    let trajet = fixture
        .add_trajet(Direction::Aller, vec![DayEntry::new(1, Parity::Even)])
        .await;

    let inserted = OccurrenceService::new(fixture.store.clone())
        .generate(&fixture.tenant, trajet.id, date("2024-01-01"), date("2024-01-21"))
        .await
        .unwrap();

    assert_eq!(inserted, 1);
}

#[tokio::test]
async fn test_generate_without_recurrence_fails() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![]).await;

    let err = OccurrenceService::new(fixture.store.clone())
        .generate(&fixture.tenant, trajet.id, date("2024-01-01"), date("2024-01-10"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ValidationFailure(_)));
}

#[tokio::test]
async fn test_occurrence_overrides_and_cancel() {
    let fixture = Fixture::new().await;
    let mut trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    trajet.id = Uuid::new_v4();
    trajet.departure_time = Some(time("07:45"));
    fixture.store.insert_trajet(trajet.clone()).await;

    let service = OccurrenceService::new(fixture.store.clone());
    service
        .generate(&fixture.tenant, trajet.id, date("2024-01-01"), date("2024-01-07"))
        .await
        .unwrap();
    let occurrence = service
        .list(&fixture.tenant, trajet.id, None, None)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(occurrence.effective.departure_time, Some(time("07:45")));

    let chauffeur = Uuid::new_v4();
    let updated = service
        .update(
            &fixture.tenant,
            occurrence.occurrence.id,
            OccurrenceOverrides {
                status: OccurrenceStatus::Planifie,
                chauffeur_id: Some(chauffeur),
                vehicule_id: None,
                departure_time: Some(time("07:30")),
                notes: Some("Remplacement".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.effective.chauffeur_id, Some(chauffeur));
    assert_eq!(updated.effective.departure_time, Some(time("07:30")));

    let cancelled = service
        .cancel(&fixture.tenant, occurrence.occurrence.id)
        .await
        .unwrap();
    assert_eq!(cancelled.occurrence.status, OccurrenceStatus::Annule);
}

#[tokio::test]
async fn test_clearing_overrides_falls_back_to_trajet_defaults() {
    let fixture = Fixture::new().await;
    let default_chauffeur = Uuid::new_v4();
    let mut trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    trajet.id = Uuid::new_v4();
    trajet.chauffeur_id = Some(default_chauffeur);
    trajet.departure_time = Some(time("07:45"));
    fixture.store.insert_trajet(trajet.clone()).await;

    let service = OccurrenceService::new(fixture.store.clone());
    service
        .generate(&fixture.tenant, trajet.id, date("2024-01-01"), date("2024-01-07"))
        .await
        .unwrap();
    let id = service
        .list(&fixture.tenant, trajet.id, None, None)
        .await
        .unwrap()[0]
        .occurrence
        .id;

    let replacement = Uuid::new_v4();
    let overridden = service
        .update(
            &fixture.tenant,
            id,
            OccurrenceOverrides {
                status: OccurrenceStatus::Planifie,
                chauffeur_id: Some(replacement),
                vehicule_id: None,
                departure_time: Some(time("07:15")),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(overridden.effective.chauffeur_id, Some(replacement));
    assert_eq!(overridden.effective.departure_time, Some(time("07:15")));

    let cleared = service
        .update(
            &fixture.tenant,
            id,
            OccurrenceOverrides {
                status: OccurrenceStatus::Planifie,
                chauffeur_id: None,
                vehicule_id: None,
                departure_time: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.occurrence.chauffeur_id, None);
    assert_eq!(cleared.occurrence.departure_time, None);
    assert_eq!(cleared.effective.chauffeur_id, Some(default_chauffeur));
    assert_eq!(cleared.effective.departure_time, Some(time("07:45")));
}

#[tokio::test]
async fn test_occurrence_of_deleted_trajet_is_left_untouched() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    let service = OccurrenceService::new(fixture.store.clone());
    service
        .generate(&fixture.tenant, trajet.id, date("2024-01-01"), date("2024-01-07"))
        .await
        .unwrap();
    let id = service
        .list(&fixture.tenant, trajet.id, None, None)
        .await
        .unwrap()[0]
        .occurrence
        .id;

    fixture.store.soft_delete_trajet(&fixture.tenant, trajet.id).await.unwrap();

    let err = service
        .update(
            &fixture.tenant,
            id,
            OccurrenceOverrides {
                status: OccurrenceStatus::Termine,
                chauffeur_id: Some(Uuid::new_v4()),
                vehicule_id: None,
                departure_time: None,
                notes: Some("Terminé".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service.cancel(&fixture.tenant, id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let stored = fixture
        .store
        .find_occurrence(&fixture.tenant, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, OccurrenceStatus::Planifie);
    assert_eq!(stored.chauffeur_id, None);
    assert_eq!(stored.notes, None);
}

#[tokio::test]
async fn test_generate_surfaces_storage_failure() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    fixture.store.set_fail_writes(true);

    let err = OccurrenceService::new(fixture.store.clone())
        .generate(&fixture.tenant, trajet.id, date("2024-01-01"), date("2024-01-10"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
}

// ---- Cálculo de rutas ----

#[tokio::test]
async fn test_route_totals_and_segments() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    let a = fixture.add_arret(&trajet, 0, Some([2.30, 48.86])).await;
    let b = fixture.add_arret(&trajet, 1, Some([2.32, 48.87])).await;
    let c = fixture.add_arret(&trajet, 2, Some([2.35, 48.85])).await;

    let routing = Arc::new(FakeRouting::with_segments(&[(2000.0, 300.0), (1500.0, 200.0)]));
    let totals = RouteCalculationService::new(fixture.store.clone(), routing.clone())
        .calculate_route(&fixture.tenant, trajet.id)
        .await
        .unwrap();

    assert_eq!(totals.total_distance_km, Decimal::new(35, 1));
    assert_eq!(totals.total_duration_seconds, 500);

    let arrets = fixture.store.list_arrets(&fixture.tenant, trajet.id).await.unwrap();
    let by_id = |id: Uuid| arrets.iter().find(|arret| arret.id == id).unwrap();
    assert_eq!(by_id(a.id).distance_km, Some(Decimal::ZERO));
    assert_eq!(by_id(a.id).duration_seconds, Some(0));
    assert_eq!(by_id(b.id).distance_km, Some(Decimal::new(2, 0)));
    assert_eq!(by_id(b.id).duration_seconds, Some(300));
    assert_eq!(by_id(c.id).distance_km, Some(Decimal::new(15, 1)));
    assert_eq!(by_id(c.id).duration_seconds, Some(200));

    let stored = fixture.store.find_trajet(&fixture.tenant, trajet.id).await.unwrap().unwrap();
    assert_eq!(stored.total_duration_seconds, Some(500));
    let geometry = stored.route_geometry.unwrap();
    assert_eq!(geometry.coordinates.len(), 3);

    let requests = routing.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.avoid_tolls));
    assert_eq!(requests[0].start, [2.30, 48.86]);
    assert_eq!(requests[1].end, [2.35, 48.85]);
}

#[tokio::test]
async fn test_route_failure_leaves_trajet_untouched() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    fixture.add_arret(&trajet, 0, Some([2.30, 48.86])).await;
    fixture.add_arret(&trajet, 1, Some([2.32, 48.87])).await;
    fixture.add_arret(&trajet, 2, Some([2.35, 48.85])).await;

    let routing = Arc::new(
        FakeRouting::with_segments(&[(2000.0, 300.0), (1500.0, 200.0)]).failing_on(2),
    );
    let err = RouteCalculationService::new(fixture.store.clone(), routing)
        .calculate_route(&fixture.tenant, trajet.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ExternalApi(_)));

    let arrets = fixture.store.list_arrets(&fixture.tenant, trajet.id).await.unwrap();
    assert!(arrets.iter().all(|a| a.distance_km.is_none() && a.duration_seconds.is_none()));
    let stored = fixture.store.find_trajet(&fixture.tenant, trajet.id).await.unwrap().unwrap();
    assert_eq!(stored.total_distance_km, None);
    assert!(stored.route_geometry.is_none());
}

#[tokio::test]
async fn test_route_requires_two_stops_with_coordinates() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    fixture.add_arret(&trajet, 0, Some([2.30, 48.86])).await;
    let routing = Arc::new(FakeRouting::with_segments(&[(1000.0, 60.0)]));
    let service = RouteCalculationService::new(fixture.store.clone(), routing.clone());

    let err = service.calculate_route(&fixture.tenant, trajet.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailure(_)));

    fixture.add_arret(&trajet, 1, None).await;
    let err = service.calculate_route(&fixture.tenant, trajet.id).await.unwrap_err();
    match err {
        AppError::ValidationFailure(message) => assert!(message.contains("Arrêt 1")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(routing.requests().is_empty());
}

#[tokio::test]
async fn test_route_allows_tolls_when_trajet_accepts_them() {
    let fixture = Fixture::new().await;
    let mut trajet = fixture.add_trajet(Direction::Retour, vec![DayEntry::every(1)]).await;
    trajet.id = Uuid::new_v4();
    trajet.peages = true;
    fixture.store.insert_trajet(trajet.clone()).await;
    fixture.add_arret(&trajet, 0, Some([2.30, 48.86])).await;
    fixture.add_arret(&trajet, 1, Some([2.32, 48.87])).await;

    let routing = Arc::new(FakeRouting::with_segments(&[(1000.0, 60.0)]));
    RouteCalculationService::new(fixture.store.clone(), routing.clone())
        .calculate_route(&fixture.tenant, trajet.id)
        .await
        .unwrap();

    assert!(!routing.requests()[0].avoid_tolls);
}

// ---- Horarios ----

#[tokio::test]
async fn test_calculate_times_respects_locks() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;

    let mut a = fixture.new_arret(&trajet, 0, None);
    a.duration_seconds = Some(0);
    let mut b = fixture.new_arret(&trajet, 1, None);
    b.duration_seconds = Some(600);
    b.arrival_time = Some(time("07:30"));
    b.time_locked = true;
    let mut c = fixture.new_arret(&trajet, 2, None);
    c.duration_seconds = Some(600);
    for arret in [&a, &b, &c] {
        fixture.store.insert_arret_row(arret.clone()).await;
    }

    let considered = ScheduleService::new(fixture.store.clone())
        .calculate_times(&fixture.tenant, trajet.id, 0)
        .await
        .unwrap();
    assert_eq!(considered, 3);

    let arrets = fixture.store.list_arrets(&fixture.tenant, trajet.id).await.unwrap();
    let times: Vec<_> = arrets.iter().map(|arret| arret.arrival_time).collect();
    assert_eq!(
        times,
        vec![Some(time("07:20")), Some(time("07:30")), Some(time("08:00"))]
    );
    assert!(arrets[1].time_locked);
}

#[tokio::test]
async fn test_calculate_times_wraps_past_midnight() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;

    let mut a = fixture.new_arret(&trajet, 0, None);
    a.duration_seconds = Some(0);
    let mut b = fixture.new_arret(&trajet, 1, None);
    b.duration_seconds = Some(1200);
    b.arrival_time = Some(time("00:10"));
    fixture.store.insert_arret_row(a.clone()).await;
    fixture.store.insert_arret_row(b).await;

    ScheduleService::new(fixture.store.clone())
        .calculate_times(&fixture.tenant, trajet.id, 0)
        .await
        .unwrap();

    let stored = fixture.store.find_arret(&fixture.tenant, a.id).await.unwrap().unwrap();
    assert_eq!(stored.arrival_time, Some(time("23:50")));
}

#[tokio::test]
async fn test_calculate_times_with_single_stop_is_noop() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Retour, vec![DayEntry::every(1)]).await;
    let arret = fixture.add_arret(&trajet, 0, None).await;

    let considered = ScheduleService::new(fixture.store.clone())
        .calculate_times(&fixture.tenant, trajet.id, 120)
        .await
        .unwrap();

    assert_eq!(considered, 0);
    let stored = fixture.store.find_arret(&fixture.tenant, arret.id).await.unwrap().unwrap();
    assert_eq!(stored.arrival_time, None);
}

#[tokio::test]
async fn test_reorder_requires_exact_stop_set() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    let a = fixture.add_arret(&trajet, 0, None).await;
    let b = fixture.add_arret(&trajet, 1, None).await;
    let c = fixture.add_arret(&trajet, 2, None).await;
    let service = ScheduleService::new(fixture.store.clone());

    let err = service
        .reorder_arrets(&fixture.tenant, trajet.id, &[a.id, b.id])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailure(_)));

    let err = service
        .reorder_arrets(&fixture.tenant, trajet.id, &[a.id, b.id, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailure(_)));

    let reordered = service
        .reorder_arrets(&fixture.tenant, trajet.id, &[c.id, a.id, b.id])
        .await
        .unwrap();
    let ids: Vec<_> = reordered.iter().map(|arret| arret.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);
}

#[tokio::test]
async fn test_lock_without_time_is_rejected() {
    let fixture = Fixture::new().await;
    let trajet = fixture.add_trajet(Direction::Aller, vec![DayEntry::every(1)]).await;
    let arret = fixture.add_arret(&trajet, 0, None).await;

    let err = ScheduleService::new(fixture.store.clone())
        .update_arret_schedule(
            &fixture.tenant,
            arret.id,
            school_transport::models::ArretScheduleUpdate {
                arrival_time: None,
                wait_time: None,
                time_locked: Some(true),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ValidationFailure(_)));
}

#[tokio::test]
async fn test_association_lookup_after_delete_is_not_found() {
    let fixture = Fixture::new().await;
    let service = AssociationService::new(fixture.store.clone());
    let association = service
        .create(&fixture.tenant, fixture.usager.id, fixture.circuit.id, fixture.address.id)
        .await
        .unwrap();

    service.delete(&fixture.tenant, association.id).await.unwrap();

    assert!(fixture
        .store
        .find_association(&fixture.tenant, association.id)
        .await
        .unwrap()
        .is_none());
    let err = service.delete(&fixture.tenant, association.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
