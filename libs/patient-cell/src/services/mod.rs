pub mod patient;
pub mod repository;

pub use patient::PatientService;
pub use repository::{PatientRepository, PostgrestPatientRepository};

#[cfg(any(test, feature = "mocks"))]
pub use repository::MockPatientRepository;
