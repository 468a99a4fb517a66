pub mod postgrest;

pub use postgrest::{ApiError, DatabaseClient};
