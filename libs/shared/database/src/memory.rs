use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_models::{Appointment, AppointmentDraft, AppointmentId, Patient, PatientDraft, PatientId};

use crate::store::{
    AppointmentFilter, EntityKind, EntityStore, StoreError, StoreResult, APPOINTMENT_PATIENT_FK,
    APPOINTMENT_SLOT_UNIQUE,
};

#[derive(Default)]
struct Tables {
    patients: BTreeMap<PatientId, Patient>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    slots: HashMap<(PatientId, DateTime<Utc>), AppointmentId>,
    // Sequences only move forward, so ids are never handed out twice.
    next_patient_id: i64,
    next_appointment_id: i64,
}

impl Tables {
    fn ensure_patient(&self, id: PatientId) -> StoreResult<()> {
        if self.patients.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation { constraint: APPOINTMENT_PATIENT_FK })
        }
    }

    fn slot_taken_by_other(&self, slot: &(PatientId, DateTime<Utc>), id: Option<AppointmentId>) -> bool {
        self.slots.get(slot).is_some_and(|owner| Some(*owner) != id)
    }
}

/// Process-local entity store guarded by a single async read/write lock.
///
/// Each trait call holds the lock for its whole duration, so version checks and
/// constraint checks are atomic with the write they guard. Nothing is held across
/// calls.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    enforce_unique_slots: bool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_unique_slots(true)
    }

    pub fn with_unique_slots(enforce_unique_slots: bool) -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_patient_id: 1,
                next_appointment_id: 1,
                ..Tables::default()
            }),
            enforce_unique_slots,
        }
    }

    pub fn enforces_unique_slots(&self) -> bool {
        self.enforce_unique_slots
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn insert_patient(&self, draft: PatientDraft) -> StoreResult<Patient> {
        let mut tables = self.tables.write().await;

        let id = PatientId(tables.next_patient_id);
        tables.next_patient_id += 1;

        let patient = Patient::from_draft(id, draft, 1);
        tables.patients.insert(id, patient.clone());
        debug!("Inserted patient {}", id);

        Ok(patient)
    }

    async fn get_patient(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(&id).cloned())
    }

    async fn scan_patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.tables.read().await.patients.values().cloned().collect())
    }

    async fn update_patient(
        &self,
        id: PatientId,
        expected_version: u64,
        draft: PatientDraft,
    ) -> StoreResult<Patient> {
        let mut tables = self.tables.write().await;

        let current = tables.patients.get_mut(&id).ok_or(StoreError::NotFound {
            entity: EntityKind::Patient,
            id: id.0,
        })?;

        if current.version != expected_version {
            debug!("Patient {} version conflict: expected {}, found {}", id, expected_version, current.version);
            return Err(StoreError::VersionConflict {
                entity: EntityKind::Patient,
                id: id.0,
                expected: expected_version,
                actual: current.version,
            });
        }

        *current = Patient::from_draft(id, draft, expected_version + 1);
        Ok(current.clone())
    }

    async fn delete_patient(&self, id: PatientId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        if !tables.patients.contains_key(&id) {
            return Ok(false);
        }

        if tables.appointments.values().any(|a| a.patient_id == id) {
            warn!("Refusing to delete patient {} with live appointments", id);
            return Err(StoreError::ForeignKeyViolation { constraint: APPOINTMENT_PATIENT_FK });
        }

        tables.patients.remove(&id);
        debug!("Deleted patient {}", id);
        Ok(true)
    }

    async fn insert_appointment(&self, draft: AppointmentDraft) -> StoreResult<Appointment> {
        let mut tables = self.tables.write().await;

        tables.ensure_patient(draft.patient_id)?;

        let slot = draft.slot();
        if self.enforce_unique_slots && tables.slot_taken_by_other(&slot, None) {
            warn!("Unique slot index rejected insert for patient {} at {}", slot.0, slot.1);
            return Err(StoreError::UniqueViolation { constraint: APPOINTMENT_SLOT_UNIQUE });
        }

        let id = AppointmentId(tables.next_appointment_id);
        tables.next_appointment_id += 1;

        let appointment = Appointment::from_draft(id, draft, 1);
        if self.enforce_unique_slots {
            tables.slots.insert(slot, id);
        }
        tables.appointments.insert(id, appointment.clone());
        debug!("Inserted appointment {}", id);

        Ok(appointment)
    }

    async fn get_appointment(&self, id: AppointmentId) -> StoreResult<Option<Appointment>> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn scan_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let tables = self.tables.read().await;

        Ok(tables
            .appointments
            .values()
            .filter(|appointment| filter.matches(appointment))
            .cloned()
            .collect())
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        expected_version: u64,
        draft: AppointmentDraft,
    ) -> StoreResult<Appointment> {
        let mut tables = self.tables.write().await;

        let (actual_version, old_slot) = match tables.appointments.get(&id) {
            Some(current) => (current.version, current.slot()),
            None => {
                return Err(StoreError::NotFound {
                    entity: EntityKind::Appointment,
                    id: id.0,
                })
            }
        };

        if actual_version != expected_version {
            debug!("Appointment {} version conflict: expected {}, found {}", id, expected_version, actual_version);
            return Err(StoreError::VersionConflict {
                entity: EntityKind::Appointment,
                id: id.0,
                expected: expected_version,
                actual: actual_version,
            });
        }

        tables.ensure_patient(draft.patient_id)?;

        let new_slot = draft.slot();
        if self.enforce_unique_slots {
            if tables.slot_taken_by_other(&new_slot, Some(id)) {
                warn!("Unique slot index rejected update of appointment {}", id);
                return Err(StoreError::UniqueViolation { constraint: APPOINTMENT_SLOT_UNIQUE });
            }
            tables.slots.remove(&old_slot);
            tables.slots.insert(new_slot, id);
        }

        let updated = Appointment::from_draft(id, draft, expected_version + 1);
        tables.appointments.insert(id, updated.clone());

        Ok(updated)
    }

    async fn delete_appointment(&self, id: AppointmentId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        match tables.appointments.remove(&id) {
            Some(removed) => {
                if self.enforce_unique_slots {
                    tables.slots.remove(&removed.slot());
                }
                debug!("Deleted appointment {}", id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
