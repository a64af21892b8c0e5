use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{Appointment, Patient, PatientDraft, PatientId};

pub const MAX_FULL_NAME_CHARS: usize = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientSearchQuery {
    /// Matched against full name and phone number. Empty means "everyone".
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    #[serde(flatten)]
    pub patient: PatientDraft,
    /// Version the caller read. When absent the version current at lookup is used.
    pub version: Option<u64>,
}

/// A patient together with the appointments that reference it.
#[derive(Debug, Clone, Serialize)]
pub struct PatientDetails {
    #[serde(flatten)]
    pub patient: Patient,
    pub appointments: Vec<Appointment>,
}

/// Entry of a patient picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientOption {
    pub id: PatientId,
    pub full_name: String,
}

impl From<&Patient> for PatientOption {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            full_name: patient.full_name.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient {0} not found")]
    NotFound(PatientId),

    #[error("Validation error on {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Patient {id} was modified by someone else (expected version {expected_version})")]
    StaleWrite { id: PatientId, expected_version: u64 },

    #[error("Patient {0} still has appointments")]
    HasAppointments(PatientId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::Validation { field, message } => AppError::ValidationError {
                field: Some(field.to_string()),
                message,
            },
            PatientError::StaleWrite { .. } => AppError::StaleWrite(err.to_string()),
            PatientError::HasAppointments(_) => AppError::Conflict {
                field: None,
                message: err.to_string(),
            },
            PatientError::Store(store) => AppError::Database(store.to_string()),
        }
    }
}
