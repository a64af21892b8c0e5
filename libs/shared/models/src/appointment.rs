use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patient::PatientId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub scheduled_at: DateTime<Utc>,
    pub patient_id: PatientId,
    pub reason: String,
    pub version: u64,
}

impl Appointment {
    pub fn from_draft(id: AppointmentId, draft: AppointmentDraft, version: u64) -> Self {
        Self {
            id,
            scheduled_at: draft.scheduled_at,
            patient_id: draft.patient_id,
            reason: draft.reason,
            version,
        }
    }

    /// The (patient, instant) pair covered by the scheduling invariant.
    pub fn slot(&self) -> (PatientId, DateTime<Utc>) {
        (self.patient_id, self.scheduled_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub scheduled_at: DateTime<Utc>,
    pub patient_id: PatientId,
    pub reason: String,
}

impl AppointmentDraft {
    pub fn slot(&self) -> (PatientId, DateTime<Utc>) {
        (self.patient_id, self.scheduled_at)
    }
}
