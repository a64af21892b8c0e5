use std::sync::Arc;

use assert_matches::assert_matches;
use futures::future::join_all;

use appointment_cell::{AppointmentError, AppointmentSchedulingService, SCHEDULED_AT_FIELD};
use shared_database::EntityStore;
use shared_models::{AppointmentId, DeleteOutcome, PatientId};
use shared_utils::test_utils::{appointment_draft, clinic_day, TestClinic};

#[tokio::test]
async fn same_patient_same_instant_is_rejected_then_next_hour_accepted() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    assert_eq!(an.id, PatientId(1));
    let service = AppointmentSchedulingService::new(clinic.shared());

    let first = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();
    assert_eq!(first.version, 1);

    let duplicate = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "followup"))
        .await;
    assert_matches!(duplicate, Err(AppointmentError::Conflict { field, .. }) if field == SCHEDULED_AT_FIELD);

    let later = service
        .create_appointment(appointment_draft(an.id, clinic_day(10, 0), "followup"))
        .await
        .unwrap();
    assert_ne!(later.id, first.id);
}

#[tokio::test]
async fn different_patients_may_share_an_instant() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let binh = clinic.add_patient("Le Binh", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();
    service
        .create_appointment(appointment_draft(binh.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_patient_is_a_validation_error_not_a_conflict() {
    let clinic = TestClinic::new();
    let service = AppointmentSchedulingService::new(clinic.shared());

    let result = service
        .create_appointment(appointment_draft(PatientId(404), clinic_day(9, 0), "checkup"))
        .await;

    assert_matches!(result, Err(AppointmentError::Validation { field: "patient_id", .. }));
}

#[tokio::test]
async fn reason_is_bounded_by_code_points() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    // 200 multi-byte characters fit even though they exceed 200 bytes.
    let at_limit = "khám".repeat(50);
    assert_eq!(at_limit.chars().count(), 200);
    service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), &at_limit))
        .await
        .unwrap();

    let too_long = "x".repeat(201);
    let result = service
        .create_appointment(appointment_draft(an.id, clinic_day(10, 0), &too_long))
        .await;
    assert_matches!(result, Err(AppointmentError::Validation { field: "reason", .. }));

    let blank = service
        .create_appointment(appointment_draft(an.id, clinic_day(11, 0), "  "))
        .await;
    assert_matches!(blank, Err(AppointmentError::Validation { field: "reason", .. }));
}

#[tokio::test]
async fn update_to_own_instant_succeeds() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();

    let updated = service
        .update_appointment(a.id, appointment_draft(an.id, clinic_day(9, 0), "checkup + bloodwork"), None)
        .await
        .unwrap();

    assert_eq!(updated.version, 2);
    assert_eq!(updated.reason, "checkup + bloodwork");
}

#[tokio::test]
async fn update_onto_another_appointment_of_same_patient_conflicts() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let binh = clinic.add_patient("Le Binh", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();
    service
        .create_appointment(appointment_draft(an.id, clinic_day(10, 0), "followup"))
        .await
        .unwrap();
    service
        .create_appointment(appointment_draft(binh.id, clinic_day(11, 0), "checkup"))
        .await
        .unwrap();

    let onto_b = service
        .update_appointment(a.id, appointment_draft(an.id, clinic_day(10, 0), "checkup"), None)
        .await;
    assert_matches!(onto_b, Err(AppointmentError::Conflict { .. }));

    // 11:00 belongs to a different patient.
    let moved = service
        .update_appointment(a.id, appointment_draft(an.id, clinic_day(11, 0), "checkup"), None)
        .await
        .unwrap();
    assert_eq!(moved.scheduled_at, clinic_day(11, 0));
}

#[tokio::test]
async fn update_to_unknown_patient_is_a_validation_error() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();

    let result = service
        .update_appointment(a.id, appointment_draft(PatientId(404), clinic_day(9, 0), "checkup"), None)
        .await;
    assert_matches!(result, Err(AppointmentError::Validation { field: "patient_id", .. }));

    let stored = clinic.store.get_appointment(a.id).await.unwrap().unwrap();
    assert_eq!(stored.patient_id, an.id);
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn update_of_missing_appointment_is_not_found() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let result = service
        .update_appointment(AppointmentId(12), appointment_draft(an.id, clinic_day(9, 0), "checkup"), None)
        .await;

    assert_matches!(result, Err(AppointmentError::NotFound(AppointmentId(12))));
}

#[tokio::test]
async fn update_with_version_already_superseded_is_stale() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();

    service
        .update_appointment(a.id, appointment_draft(an.id, clinic_day(10, 0), "checkup"), Some(1))
        .await
        .unwrap();

    let stale = service
        .update_appointment(a.id, appointment_draft(an.id, clinic_day(11, 0), "checkup"), Some(1))
        .await;
    assert_matches!(stale, Err(AppointmentError::StaleWrite { expected_version: 1, .. }));

    // The first writer's change is kept.
    let stored = clinic.store.get_appointment(a.id).await.unwrap().unwrap();
    assert_eq!(stored.scheduled_at, clinic_day(10, 0));
    assert_eq!(stored.version, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_from_same_version_yield_one_winner() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = Arc::new(AppointmentSchedulingService::new(clinic.shared()));

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();

    let (appointment_id, version, patient_id) = (a.id, a.version, an.id);
    let handles = [13, 14].map(|hour| {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .update_appointment(
                    appointment_id,
                    appointment_draft(patient_id, clinic_day(hour, 0), "moved"),
                    Some(version),
                )
                .await
        })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let stale = results
        .iter()
        .filter(|r| matches!(r, Err(AppointmentError::StaleWrite { .. })))
        .count();
    assert_eq!((winners, stale), (1, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_for_one_slot_yield_one_booking() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = Arc::new(AppointmentSchedulingService::new(clinic.shared()));

    let patient_id = an.id;
    let handles = (0..8).map(|i| {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_appointment(appointment_draft(patient_id, clinic_day(9, 0), &format!("request {}", i)))
                .await
        })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(AppointmentError::Conflict { .. }))));
}

#[tokio::test]
async fn update_after_delete_is_not_found() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();
    service.delete_appointment(a.id).await.unwrap();

    let result = service
        .update_appointment(a.id, appointment_draft(an.id, clinic_day(10, 0), "checkup"), Some(a.version))
        .await;
    assert_matches!(result, Err(AppointmentError::NotFound(_)));
}

#[tokio::test]
async fn repeated_deletes_never_error() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();

    assert_eq!(service.delete_appointment(a.id).await.unwrap(), DeleteOutcome::Deleted);
    assert_eq!(service.delete_appointment(a.id).await.unwrap(), DeleteOutcome::AlreadyAbsent);
    assert_eq!(service.delete_appointment(a.id).await.unwrap(), DeleteOutcome::AlreadyAbsent);
    assert_eq!(
        service.delete_appointment(AppointmentId(999)).await.unwrap(),
        DeleteOutcome::AlreadyAbsent
    );
}

#[tokio::test]
async fn deleted_slot_can_be_booked_again() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();
    service.delete_appointment(a.id).await.unwrap();

    let rebooked = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();
    assert!(rebooked.id > a.id);
}

#[tokio::test]
async fn listing_is_ordered_by_time_and_carries_patient_names() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let binh = clinic.add_patient("Le Binh", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    for (patient, hour) in [(an.id, 15), (binh.id, 8), (an.id, 10)] {
        service
            .create_appointment(appointment_draft(patient, clinic_day(hour, 0), "checkup"))
            .await
            .unwrap();
    }

    let listing = service.list_appointments().await.unwrap();
    let rows: Vec<_> = listing
        .iter()
        .map(|l| (l.appointment.scheduled_at, l.patient_name.as_str()))
        .collect();

    assert_eq!(
        rows,
        vec![
            (clinic_day(8, 0), "Le Binh"),
            (clinic_day(10, 0), "Tran An"),
            (clinic_day(15, 0), "Tran An"),
        ]
    );
}

#[tokio::test]
async fn get_appointment_joins_patient_name() {
    let clinic = TestClinic::new();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    let a = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();

    let details = service.get_appointment(a.id).await.unwrap();
    assert_eq!(details.patient_name, "Tran An");
    assert_eq!(details.appointment, a);

    assert_matches!(
        service.get_appointment(AppointmentId(77)).await,
        Err(AppointmentError::NotFound(_))
    );
}

#[tokio::test]
async fn checker_still_blocks_duplicates_without_store_index() {
    let clinic = TestClinic::without_unique_slots();
    let an = clinic.add_patient("Tran An", None).await;
    let service = AppointmentSchedulingService::new(clinic.shared());

    service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "checkup"))
        .await
        .unwrap();
    let duplicate = service
        .create_appointment(appointment_draft(an.id, clinic_day(9, 0), "followup"))
        .await;

    assert_matches!(duplicate, Err(AppointmentError::Conflict { .. }));
}
