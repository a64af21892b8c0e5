pub mod conflict;
pub mod scheduling;

pub use conflict::ConflictDetectionService;
pub use scheduling::AppointmentSchedulingService;
