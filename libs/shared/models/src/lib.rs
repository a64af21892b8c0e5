pub mod appointment;
pub mod error;
pub mod outcome;
pub mod patient;

pub use appointment::{Appointment, AppointmentDraft, AppointmentId};
pub use outcome::DeleteOutcome;
pub use patient::{Patient, PatientDraft, PatientId};
