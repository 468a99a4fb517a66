pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Doctor, DoctorError, DoctorSummary};
pub use router::doctor_routes;
pub use services::{DoctorRepository, DoctorService, PostgrestDoctorRepository};
