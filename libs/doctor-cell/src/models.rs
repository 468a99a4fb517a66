use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::validation::{is_valid_email, optional_non_empty, require_non_empty};

// ==============================================================================
// CORE DOCTOR MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub crm: i32,
    pub specialty: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The doctor as embedded in an appointment, without credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub crm: i32,
    pub specialty: String,
}

impl From<&Doctor> for DoctorSummary {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name.clone(),
            email: doctor.email.clone(),
            crm: doctor.crm,
            specialty: doctor.specialty.clone(),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub crm: i32,
    pub specialty: String,
}

impl CreateDoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        require_non_empty(&self.name, "Name is required").map_err(DoctorError::ValidationError)?;
        require_non_empty(&self.email, "Email is required").map_err(DoctorError::ValidationError)?;
        if !is_valid_email(&self.email) {
            return Err(DoctorError::ValidationError("Invalid email format".to_string()));
        }
        require_non_empty(&self.password, "Password is required").map_err(DoctorError::ValidationError)?;
        if self.crm <= 0 {
            return Err(DoctorError::ValidationError("CRM must be a positive integer".to_string()));
        }
        require_non_empty(&self.specialty, "Specialty is required").map_err(DoctorError::ValidationError)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub crm: Option<i32>,
    pub specialty: Option<String>,
}

impl UpdateDoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        optional_non_empty(self.name.as_deref(), "Name cannot be empty")
            .map_err(DoctorError::ValidationError)?;
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(DoctorError::ValidationError("Invalid email format".to_string()));
            }
        }
        optional_non_empty(self.password.as_deref(), "Password cannot be empty")
            .map_err(DoctorError::ValidationError)?;
        if matches!(self.crm, Some(crm) if crm <= 0) {
            return Err(DoctorError::ValidationError("CRM must be a positive integer".to_string()));
        }
        optional_non_empty(self.specialty.as_deref(), "Specialty cannot be empty")
            .map_err(DoctorError::ValidationError)?;
        Ok(())
    }
}

// ==============================================================================
// PERSISTENCE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub crm: i32,
    pub specialty: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub crm: Option<i32>,
    pub specialty: Option<String>,
    pub password_hash: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Resource Doctor for id: {0} not found")]
    NotFound(Uuid),

    #[error("CRM already exists")]
    CrmAlreadyExists,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("{0}")]
    ValidationError(String),

    #[error("Failed to hash password: {0}")]
    PasswordHashError(String),

    #[error("Doctor still has appointments")]
    HasAppointments,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::CrmAlreadyExists | DoctorError::EmailAlreadyExists => {
                AppError::BadRequest(err.to_string())
            }
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::PasswordHashError(_) => AppError::Internal(err.to_string()),
            DoctorError::HasAppointments => AppError::Conflict(err.to_string()),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
