// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{Appointment, AppointmentDraft, AppointmentId, PatientId};

pub const MAX_REASON_CHARS: usize = 200;

pub const SCHEDULED_AT_FIELD: &str = "scheduled_at";

pub const SLOT_TAKEN_MESSAGE: &str = "This patient already has an appointment at this time.";

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub scheduled_at: DateTime<Utc>,
    pub patient_id: PatientId,
    pub reason: String,
}

impl From<CreateAppointmentRequest> for AppointmentDraft {
    fn from(request: CreateAppointmentRequest) -> Self {
        Self {
            scheduled_at: request.scheduled_at,
            patient_id: request.patient_id,
            reason: request.reason,
        }
    }
}

/// Full replacement of an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub scheduled_at: DateTime<Utc>,
    pub patient_id: PatientId,
    pub reason: String,
    /// Version the caller read. When absent the version current at lookup is used.
    pub version: Option<u64>,
}

impl UpdateAppointmentRequest {
    pub fn into_parts(self) -> (AppointmentDraft, Option<u64>) {
        let draft = AppointmentDraft {
            scheduled_at: self.scheduled_at,
            patient_id: self.patient_id,
            reason: self.reason,
        };
        (draft, self.version)
    }
}

/// An appointment joined with the display name of its patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentListing {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConflictCheckQuery {
    pub patient_id: PatientId,
    pub scheduled_at: DateTime<Utc>,
    pub exclude_appointment_id: Option<AppointmentId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<Appointment>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Validation error on {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The scheduling invariant would be broken. An expected outcome, not a failure.
    #[error("Conflict on {field}: {message}")]
    Conflict { field: &'static str, message: String },

    #[error("Appointment {0} not found")]
    NotFound(AppointmentId),

    #[error("Appointment {id} was modified by someone else (expected version {expected_version})")]
    StaleWrite { id: AppointmentId, expected_version: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppointmentError {
    pub fn slot_taken() -> Self {
        AppointmentError::Conflict {
            field: SCHEDULED_AT_FIELD,
            message: SLOT_TAKEN_MESSAGE.to_string(),
        }
    }

    pub fn unknown_patient(patient_id: PatientId) -> Self {
        AppointmentError::Validation {
            field: "patient_id",
            message: format!("Patient {} does not exist", patient_id),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation { field, message } => AppError::ValidationError {
                field: Some(field.to_string()),
                message,
            },
            AppointmentError::Conflict { field, message } => AppError::Conflict {
                field: Some(field.to_string()),
                message,
            },
            AppointmentError::NotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::StaleWrite { .. } => AppError::StaleWrite(err.to_string()),
            AppointmentError::Store(store) => AppError::Database(store.to_string()),
        }
    }
}
