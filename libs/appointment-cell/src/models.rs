use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::DoctorSummary;
use patient_cell::PatientSummary;
use shared_models::error::AppError;
use shared_utils::validation::{optional_non_empty, require_non_empty};

// ==============================================================================
// CORE APPOINTMENT MODEL
// ==============================================================================

/// A stored appointment with its doctor and patient loaded.
///
/// `date` (`DD/MM/YYYY`) and `hour` (`HH:MM`) are optional because rows
/// written partially can still be read back; the cancellation rules reject
/// such records instead of failing to load them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Appointment {
    pub id: Uuid,
    pub date: Option<String>,
    pub hour: Option<String>,
    pub doctor: DoctorSummary,
    pub patient: PatientSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub date: String,
    pub hour: String,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        require_non_empty(&self.date, "Date is required").map_err(AppointmentError::ValidationError)?;
        require_non_empty(&self.hour, "Hour is required").map_err(AppointmentError::ValidationError)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub date: Option<String>,
    pub hour: Option<String>,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

impl UpdateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        optional_non_empty(self.date.as_deref(), "Date cannot be empty")
            .map_err(AppointmentError::ValidationError)?;
        optional_non_empty(self.hour.as_deref(), "Hour cannot be empty")
            .map_err(AppointmentError::ValidationError)?;
        Ok(())
    }

    pub fn changes_schedule(&self) -> bool {
        self.date.is_some() || self.hour.is_some()
    }
}

// ==============================================================================
// PERSISTENCE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub date: String,
    pub hour: String,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentChanges {
    pub date: Option<String>,
    pub hour: Option<String>,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

impl From<UpdateAppointmentRequest> for AppointmentChanges {
    fn from(request: UpdateAppointmentRequest) -> Self {
        Self {
            date: request.date,
            hour: request.hour,
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Invalid date format. Expected DD/MM/YYYY")]
    InvalidDateFormat,

    #[error("Invalid date")]
    InvalidDate,

    #[error("Invalid time format. Expected HH:MM")]
    InvalidTimeFormat,

    #[error("Appointment date and time cannot be in the past")]
    AppointmentInPast,

    #[error("Appointments can only be scheduled for the current year ({current_year})")]
    YearOutOfRange { current_year: i32 },

    #[error("Cannot update appointment without hour")]
    MissingHourOnDateUpdate,

    #[error("Appointment already exists")]
    AppointmentConflict,

    #[error("Appointment date is incomplete")]
    IncompleteAppointmentData,

    #[error("Cannot cancel appointment within 2 hours of the scheduled time")]
    WithinCancellationWindow,

    #[error("Resource Appointment with id {0} not found")]
    NotFound(Uuid),

    #[error("Resource Doctor with id {0} not found")]
    DoctorNotFound(Uuid),

    #[error("Resource Patient with id {0} not found")]
    PatientNotFound(Uuid),

    #[error("Resource No appointments found for doctor with id {0} not found")]
    NoAppointmentsForDoctor(Uuid),

    #[error("Resource No appointments found for patient with id {0} not found")]
    NoAppointmentsForPatient(Uuid),

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_)
            | AppointmentError::DoctorNotFound(_)
            | AppointmentError::PatientNotFound(_)
            | AppointmentError::NoAppointmentsForDoctor(_)
            | AppointmentError::NoAppointmentsForPatient(_) => AppError::NotFound(err.to_string()),
            AppointmentError::AppointmentConflict => AppError::Conflict(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
