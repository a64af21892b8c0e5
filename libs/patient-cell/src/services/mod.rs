pub mod patient;
pub mod search;

pub use patient::PatientService;
pub use search::PatientMatches;
