//! Persistence interface consumed by the cells.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use shared_models::{Appointment, AppointmentDraft, AppointmentId, Patient, PatientDraft, PatientId};

/// Unique index over live appointments.
pub const APPOINTMENT_SLOT_UNIQUE: &str = "appointments_patient_id_scheduled_at_key";

/// `appointments.patient_id -> patients.id`
pub const APPOINTMENT_PATIENT_FK: &str = "appointments_patient_id_fkey";

pub type StoreResult<T> = Result<T, StoreError>;

pub type SharedStore = Arc<dyn EntityStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Patient,
    Appointment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Patient => write!(f, "patient"),
            EntityKind::Appointment => write!(f, "appointment"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("{entity} {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        entity: EntityKind,
        id: i64,
        expected: u64,
        actual: u64,
    },

    #[error("unique constraint {constraint} violated")]
    UniqueViolation { constraint: &'static str },

    #[error("foreign key constraint {constraint} violated")]
    ForeignKeyViolation { constraint: &'static str },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Predicate for appointment scans. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub patient_id: Option<PatientId>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub exclude_id: Option<AppointmentId>,
}

impl AppointmentFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_patient(patient_id: PatientId) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::default()
        }
    }

    pub fn at(mut self, scheduled_at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(scheduled_at);
        self
    }

    pub fn excluding(mut self, id: Option<AppointmentId>) -> Self {
        self.exclude_id = id;
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.patient_id.map_or(true, |p| appointment.patient_id == p)
            && self.scheduled_at.map_or(true, |t| appointment.scheduled_at == t)
            && self.exclude_id.map_or(true, |id| appointment.id != id)
    }
}

/// Patients and appointments with referential integrity and versioned writes.
///
/// Every `update_*` is a compare-and-swap on the record's `version`: it succeeds
/// only when `expected_version` equals the stored version and bumps it by one.
/// Deletes report whether a record was actually removed.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_patient(&self, draft: PatientDraft) -> StoreResult<Patient>;

    async fn get_patient(&self, id: PatientId) -> StoreResult<Option<Patient>>;

    /// All patients in insertion order.
    async fn scan_patients(&self) -> StoreResult<Vec<Patient>>;

    async fn update_patient(
        &self,
        id: PatientId,
        expected_version: u64,
        draft: PatientDraft,
    ) -> StoreResult<Patient>;

    /// Fails with `ForeignKeyViolation` while the patient still owns appointments.
    async fn delete_patient(&self, id: PatientId) -> StoreResult<bool>;

    async fn insert_appointment(&self, draft: AppointmentDraft) -> StoreResult<Appointment>;

    async fn get_appointment(&self, id: AppointmentId) -> StoreResult<Option<Appointment>>;

    /// Appointments matching `filter`, in insertion order.
    async fn scan_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>>;

    async fn update_appointment(
        &self,
        id: AppointmentId,
        expected_version: u64,
        draft: AppointmentDraft,
    ) -> StoreResult<Appointment>;

    async fn delete_appointment(&self, id: AppointmentId) -> StoreResult<bool>;
}
