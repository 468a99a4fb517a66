pub mod doctor;
pub mod repository;

pub use doctor::DoctorService;
pub use repository::{DoctorRepository, PostgrestDoctorRepository};

#[cfg(any(test, feature = "mocks"))]
pub use repository::MockDoctorRepository;
