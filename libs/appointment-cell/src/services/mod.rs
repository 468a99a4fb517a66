pub mod booking;
pub mod cancellation;
pub mod conflict;
pub mod datetime;
pub mod repository;
pub mod scheduling;

pub use booking::AppointmentService;
pub use conflict::ConflictChecker;
pub use repository::{AppointmentRepository, PostgrestAppointmentRepository};
