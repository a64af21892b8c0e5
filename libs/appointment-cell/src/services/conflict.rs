use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use shared_database::{AppointmentFilter, SharedStore};
use shared_models::{Appointment, AppointmentId, PatientId};

use crate::models::{AppointmentError, ConflictCheckResponse};

/// Read-only scheduling invariant check: one appointment per patient per instant.
pub struct ConflictDetectionService {
    store: SharedStore,
}

impl ConflictDetectionService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// True when another live appointment of `patient_id` sits at exactly
    /// `scheduled_at`. The appointment with id `exclude_appointment_id` is not
    /// counted, so an appointment never collides with itself on update.
    pub async fn has_conflict(
        &self,
        patient_id: PatientId,
        scheduled_at: DateTime<Utc>,
        exclude_appointment_id: Option<AppointmentId>,
    ) -> Result<bool, AppointmentError> {
        let conflicting = self
            .conflicting_appointments(patient_id, scheduled_at, exclude_appointment_id)
            .await?;

        Ok(!conflicting.is_empty())
    }

    pub async fn check_conflicts(
        &self,
        patient_id: PatientId,
        scheduled_at: DateTime<Utc>,
        exclude_appointment_id: Option<AppointmentId>,
    ) -> Result<ConflictCheckResponse, AppointmentError> {
        let conflicting_appointments = self
            .conflicting_appointments(patient_id, scheduled_at, exclude_appointment_id)
            .await?;

        Ok(ConflictCheckResponse {
            has_conflict: !conflicting_appointments.is_empty(),
            conflicting_appointments,
        })
    }

    async fn conflicting_appointments(
        &self,
        patient_id: PatientId,
        scheduled_at: DateTime<Utc>,
        exclude_appointment_id: Option<AppointmentId>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Checking conflicts for patient {} at {}", patient_id, scheduled_at);

        let filter = AppointmentFilter::for_patient(patient_id)
            .at(scheduled_at)
            .excluding(exclude_appointment_id);

        let conflicting = self.store.scan_appointments(filter).await?;

        if !conflicting.is_empty() {
            warn!(
                "Conflict detected for patient {} at {} - {} existing appointment(s)",
                patient_id,
                scheduled_at,
                conflicting.len()
            );
        }

        Ok(conflicting)
    }
}
