use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned patient identifier. Never reused within a store lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub i64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    /// Write-version for optimistic concurrency; starts at 1.
    pub version: u64,
}

impl Patient {
    pub fn from_draft(id: PatientId, draft: PatientDraft, version: u64) -> Self {
        Self {
            id,
            full_name: draft.full_name,
            date_of_birth: draft.date_of_birth,
            gender: draft.gender,
            phone_number: draft.phone_number,
            address: draft.address,
            version,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.full_name
    }
}

/// Full caller-supplied state of a patient, used for both create and replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDraft {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}
