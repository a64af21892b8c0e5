use tracing::{debug, info, warn};

use shared_database::{AppointmentFilter, SharedStore, StoreError};
use shared_models::{DeleteOutcome, Patient, PatientDraft, PatientId};

use crate::models::{PatientDetails, PatientError, PatientOption, MAX_FULL_NAME_CHARS};
use crate::services::search::PatientMatches;

pub struct PatientService {
    store: SharedStore,
}

impl PatientService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create_patient(&self, draft: PatientDraft) -> Result<Patient, PatientError> {
        debug!("Creating patient record for: {}", draft.full_name);

        validate_draft(&draft)?;

        let patient = self.store.insert_patient(draft).await?;
        info!("Patient {} created", patient.id);

        Ok(patient)
    }

    /// Patient with its appointments, earliest first.
    pub async fn get_patient(&self, id: PatientId) -> Result<PatientDetails, PatientError> {
        debug!("Fetching patient: {}", id);

        let patient = self
            .store
            .get_patient(id)
            .await?
            .ok_or(PatientError::NotFound(id))?;

        let mut appointments = self
            .store
            .scan_appointments(AppointmentFilter::for_patient(id))
            .await?;
        appointments.sort_by_key(|a| (a.scheduled_at, a.id));

        Ok(PatientDetails { patient, appointments })
    }

    /// Full replace guarded by the record version.
    pub async fn update_patient(
        &self,
        id: PatientId,
        draft: PatientDraft,
        expected_version: Option<u64>,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient: {}", id);

        let current = self
            .store
            .get_patient(id)
            .await?
            .ok_or(PatientError::NotFound(id))?;

        validate_draft(&draft)?;

        let version = expected_version.unwrap_or(current.version);

        match self.store.update_patient(id, version, draft).await {
            Ok(updated) => {
                info!("Patient {} updated to version {}", id, updated.version);
                Ok(updated)
            }
            Err(StoreError::NotFound { .. }) => Err(PatientError::NotFound(id)),
            Err(StoreError::VersionConflict { .. }) => {
                if self.store.get_patient(id).await?.is_none() {
                    return Err(PatientError::NotFound(id));
                }
                warn!("Stale write rejected for patient {} at version {}", id, version);
                Err(PatientError::StaleWrite { id, expected_version: version })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Absent patients are reported as `AlreadyAbsent`, not as an error.
    pub async fn delete_patient(&self, id: PatientId) -> Result<DeleteOutcome, PatientError> {
        debug!("Deleting patient: {}", id);

        match self.store.delete_patient(id).await {
            Ok(removed) => Ok(DeleteOutcome::from_removed(removed)),
            Err(StoreError::ForeignKeyViolation { .. }) => Err(PatientError::HasAppointments(id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_patient_options(&self) -> Result<Vec<PatientOption>, PatientError> {
        let patients = self.store.scan_patients().await?;
        Ok(patients.iter().map(PatientOption::from).collect())
    }

    /// Case-insensitive substring search over full name and phone number.
    pub async fn search_patients(&self, query: Option<&str>) -> Result<PatientMatches, PatientError> {
        debug!("Searching patients with query: {:?}", query);

        let snapshot = self.store.scan_patients().await?;
        Ok(PatientMatches::new(snapshot, query))
    }
}

fn validate_draft(draft: &PatientDraft) -> Result<(), PatientError> {
    let name = draft.full_name.trim();

    if name.is_empty() {
        return Err(PatientError::Validation {
            field: "full_name",
            message: "Full name is required".to_string(),
        });
    }

    if name.chars().count() > MAX_FULL_NAME_CHARS {
        return Err(PatientError::Validation {
            field: "full_name",
            message: format!("Full name must be at most {} characters", MAX_FULL_NAME_CHARS),
        });
    }

    Ok(())
}
