pub mod memory;
pub mod store;

pub use memory::InMemoryStore;
pub use store::{
    AppointmentFilter, EntityKind, EntityStore, SharedStore, StoreError, StoreResult,
    APPOINTMENT_PATIENT_FK, APPOINTMENT_SLOT_UNIQUE,
};
