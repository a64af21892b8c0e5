// libs/appointment-cell/src/services/scheduling.rs
use std::collections::HashMap;

use tracing::{debug, info, warn};

use shared_database::{AppointmentFilter, SharedStore, StoreError};
use shared_models::{Appointment, AppointmentDraft, AppointmentId, DeleteOutcome, PatientId};

use crate::models::{AppointmentError, AppointmentListing, MAX_REASON_CHARS};
use crate::services::conflict::ConflictDetectionService;

/// Create/update/delete of appointments with the conflict check in front of
/// every scheduling write.
///
/// The conflict check and the write that follows are separate store calls. The
/// store's unique slot index closes that window: a rejection there is reported as
/// the same `Conflict` the pre-check produces.
pub struct AppointmentSchedulingService {
    store: SharedStore,
    conflict_service: ConflictDetectionService,
}

impl AppointmentSchedulingService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            conflict_service: ConflictDetectionService::new(store.clone()),
            store,
        }
    }

    pub async fn create_appointment(&self, draft: AppointmentDraft) -> Result<Appointment, AppointmentError> {
        info!("Scheduling appointment for patient {} at {}", draft.patient_id, draft.scheduled_at);

        validate_reason(&draft.reason)?;

        if self.store.get_patient(draft.patient_id).await?.is_none() {
            return Err(AppointmentError::unknown_patient(draft.patient_id));
        }

        if self
            .conflict_service
            .has_conflict(draft.patient_id, draft.scheduled_at, None)
            .await?
        {
            return Err(AppointmentError::slot_taken());
        }

        let patient_id = draft.patient_id;
        let appointment = self
            .store
            .insert_appointment(draft)
            .await
            .map_err(|e| map_write_error(e, patient_id))?;

        info!("Appointment {} created", appointment.id);
        Ok(appointment)
    }

    /// Full replace of `id`. `expected_version` is the version the caller read;
    /// without one, the version seen at lookup is used.
    pub async fn update_appointment(
        &self,
        id: AppointmentId,
        draft: AppointmentDraft,
        expected_version: Option<u64>,
    ) -> Result<Appointment, AppointmentError> {
        info!("Updating appointment {}", id);

        let current = self
            .store
            .get_appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound(id))?;

        validate_reason(&draft.reason)?;

        if self.store.get_patient(draft.patient_id).await?.is_none() {
            return Err(AppointmentError::unknown_patient(draft.patient_id));
        }

        if self
            .conflict_service
            .has_conflict(draft.patient_id, draft.scheduled_at, Some(id))
            .await?
        {
            return Err(AppointmentError::slot_taken());
        }

        let version = expected_version.unwrap_or(current.version);
        let patient_id = draft.patient_id;

        match self.store.update_appointment(id, version, draft).await {
            Ok(updated) => {
                info!("Appointment {} updated to version {}", id, updated.version);
                Ok(updated)
            }
            Err(StoreError::NotFound { .. }) => Err(AppointmentError::NotFound(id)),
            Err(StoreError::VersionConflict { .. }) => {
                // Deleted underneath us reads as not found, anything else is stale.
                if self.store.get_appointment(id).await?.is_none() {
                    return Err(AppointmentError::NotFound(id));
                }
                warn!("Stale write rejected for appointment {} at version {}", id, version);
                Err(AppointmentError::StaleWrite { id, expected_version: version })
            }
            Err(e) => Err(map_write_error(e, patient_id)),
        }
    }

    pub async fn delete_appointment(&self, id: AppointmentId) -> Result<DeleteOutcome, AppointmentError> {
        let outcome = DeleteOutcome::from_removed(self.store.delete_appointment(id).await?);

        match outcome {
            DeleteOutcome::Deleted => info!("Appointment {} deleted", id),
            DeleteOutcome::AlreadyAbsent => debug!("Appointment {} already absent", id),
        }

        Ok(outcome)
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> Result<AppointmentListing, AppointmentError> {
        debug!("Fetching appointment {}", id);

        let appointment = self
            .store
            .get_appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound(id))?;

        let patient_name = self
            .store
            .get_patient(appointment.patient_id)
            .await?
            .map(|p| p.display_name().to_string())
            .unwrap_or_default();

        Ok(AppointmentListing { appointment, patient_name })
    }

    /// Every appointment ordered by time, joined with its patient's name.
    pub async fn list_appointments(&self) -> Result<Vec<AppointmentListing>, AppointmentError> {
        let names: HashMap<_, _> = self
            .store
            .scan_patients()
            .await?
            .into_iter()
            .map(|p| (p.id, p.display_name().to_string()))
            .collect();

        let mut appointments = self
            .store
            .scan_appointments(AppointmentFilter::all())
            .await?;
        appointments.sort_by_key(|a| (a.scheduled_at, a.id));

        Ok(appointments
            .into_iter()
            .map(|appointment| {
                let patient_name = names.get(&appointment.patient_id).cloned().unwrap_or_else(|| {
                    warn!("Appointment {} references missing patient {}", appointment.id, appointment.patient_id);
                    String::new()
                });
                AppointmentListing { appointment, patient_name }
            })
            .collect())
    }
}

fn map_write_error(err: StoreError, patient_id: PatientId) -> AppointmentError {
    match err {
        StoreError::UniqueViolation { constraint } => {
            warn!("Store rejected duplicate slot via {}", constraint);
            AppointmentError::slot_taken()
        }
        StoreError::ForeignKeyViolation { .. } => AppointmentError::unknown_patient(patient_id),
        other => AppointmentError::Store(other),
    }
}

fn validate_reason(reason: &str) -> Result<(), AppointmentError> {
    if reason.trim().is_empty() {
        return Err(AppointmentError::Validation {
            field: "reason",
            message: "Reason is required".to_string(),
        });
    }

    if reason.chars().count() > MAX_REASON_CHARS {
        return Err(AppointmentError::Validation {
            field: "reason",
            message: format!("Reason must be at most {} characters", MAX_REASON_CHARS),
        });
    }

    Ok(())
}
