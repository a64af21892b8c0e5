use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mockall::mock;

use shared_database::{AppointmentFilter, EntityStore, InMemoryStore, SharedStore, StoreResult};
use shared_models::{Appointment, AppointmentDraft, AppointmentId, Patient, PatientDraft, PatientId};

// Scriptable store for failure paths the in-memory store never produces.
mock! {
    pub Store {}

    #[async_trait]
    impl EntityStore for Store {
        async fn insert_patient(&self, draft: PatientDraft) -> StoreResult<Patient>;
        async fn get_patient(&self, id: PatientId) -> StoreResult<Option<Patient>>;
        async fn scan_patients(&self) -> StoreResult<Vec<Patient>>;
        async fn update_patient(&self, id: PatientId, expected_version: u64, draft: PatientDraft) -> StoreResult<Patient>;
        async fn delete_patient(&self, id: PatientId) -> StoreResult<bool>;
        async fn insert_appointment(&self, draft: AppointmentDraft) -> StoreResult<Appointment>;
        async fn get_appointment(&self, id: AppointmentId) -> StoreResult<Option<Appointment>>;
        async fn scan_appointments(&self, filter: AppointmentFilter) -> StoreResult<Vec<Appointment>>;
        async fn update_appointment(&self, id: AppointmentId, expected_version: u64, draft: AppointmentDraft) -> StoreResult<Appointment>;
        async fn delete_appointment(&self, id: AppointmentId) -> StoreResult<bool>;
    }
}

pub struct TestPatient {
    pub full_name: String,
    pub phone_number: Option<String>,
    pub gender: String,
    pub date_of_birth: NaiveDate,
}

impl Default for TestPatient {
    fn default() -> Self {
        Self {
            full_name: "Tran An".to_string(),
            phone_number: Some("0901234567".to_string()),
            gender: "Male".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 14).unwrap(),
        }
    }
}

impl TestPatient {
    pub fn new(full_name: &str, phone_number: Option<&str>) -> Self {
        Self {
            full_name: full_name.to_string(),
            phone_number: phone_number.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn to_draft(&self) -> PatientDraft {
        PatientDraft {
            full_name: self.full_name.clone(),
            date_of_birth: self.date_of_birth,
            gender: self.gender.clone(),
            phone_number: self.phone_number.clone(),
            address: Some("12 Le Loi, District 1".to_string()),
        }
    }

    /// The record a store would hold for this patient.
    pub fn stored(&self, id: PatientId, version: u64) -> Patient {
        Patient::from_draft(id, self.to_draft(), version)
    }
}

/// A fresh in-memory store plus helpers for seeding it.
pub struct TestClinic {
    pub store: Arc<InMemoryStore>,
}

impl Default for TestClinic {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClinic {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
        }
    }

    pub fn without_unique_slots() -> Self {
        Self {
            store: Arc::new(InMemoryStore::with_unique_slots(false)),
        }
    }

    pub fn shared(&self) -> SharedStore {
        self.store.clone()
    }

    pub async fn add_patient(&self, full_name: &str, phone_number: Option<&str>) -> Patient {
        self.store
            .insert_patient(TestPatient::new(full_name, phone_number).to_draft())
            .await
            .expect("seeding a patient into the in-memory store cannot fail")
    }
}

/// 2024-01-10 at the given hour and minute, UTC.
pub fn clinic_day(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, hour, minute, 0).unwrap()
}

pub fn appointment_draft(patient_id: PatientId, scheduled_at: DateTime<Utc>, reason: &str) -> AppointmentDraft {
    AppointmentDraft {
        scheduled_at,
        patient_id,
        reason: reason.to_string(),
    }
}
