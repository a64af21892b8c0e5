use serde::Serialize;

/// Result of an idempotent delete. Both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

impl DeleteOutcome {
    pub fn from_removed(removed: bool) -> Self {
        if removed {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::AlreadyAbsent
        }
    }
}
