mod in_memory;
mod prescription_storage;
pub mod sqlite;

pub use in_memory::{InMemoryPrescriptionStore, NewPrescription, NewUser};
pub use prescription_storage::{PrescriptionStore, StoreError};
pub use sqlite::SqlitePrescriptionStore;
