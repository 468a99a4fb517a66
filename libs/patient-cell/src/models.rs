use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::validation::{is_valid_email, optional_non_empty, require_non_empty};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub cellphone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The patient as embedded in an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PatientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub cellphone: Option<String>,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name.clone(),
            email: patient.email.clone(),
            birth_date: patient.birth_date,
            cellphone: patient.cellphone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub birth_date: NaiveDate,
    pub cellphone: Option<String>,
}

impl CreatePatientRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        require_non_empty(&self.name, "Name is required").map_err(PatientError::ValidationError)?;
        require_non_empty(&self.email, "Email is required").map_err(PatientError::ValidationError)?;
        if !is_valid_email(&self.email) {
            return Err(PatientError::ValidationError("Invalid email format".to_string()));
        }
        require_non_empty(&self.password, "Password is required").map_err(PatientError::ValidationError)?;
        optional_non_empty(self.cellphone.as_deref(), "Cellphone cannot be empty")
            .map_err(PatientError::ValidationError)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub cellphone: Option<String>,
}

impl UpdatePatientRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        optional_non_empty(self.name.as_deref(), "Name cannot be empty")
            .map_err(PatientError::ValidationError)?;
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(PatientError::ValidationError("Invalid email format".to_string()));
            }
        }
        optional_non_empty(self.password.as_deref(), "Password cannot be empty")
            .map_err(PatientError::ValidationError)?;
        optional_non_empty(self.cellphone.as_deref(), "Cellphone cannot be empty")
            .map_err(PatientError::ValidationError)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub cellphone: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub cellphone: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PatientError {
    #[error("Resource Patient for id: {0} not found")]
    NotFound(Uuid),

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("{0}")]
    ValidationError(String),

    #[error("Failed to hash password: {0}")]
    PasswordHashError(String),

    #[error("Patient still has appointments")]
    HasAppointments,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::EmailAlreadyExists => AppError::BadRequest(err.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::PasswordHashError(_) => AppError::Internal(err.to_string()),
            PatientError::HasAppointments => AppError::Conflict(err.to_string()),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_create_request_reads_camel_case() {
        let request: CreatePatientRequest = serde_json::from_value(json!({
            "name": "Jane",
            "email": "jane@test.com",
            "password": "secret",
            "birthDate": "1990-05-17"
        }))
        .unwrap();

        assert_eq!(request.birth_date, NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());
        assert!(request.cellphone.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_empty_cellphone() {
        let request = CreatePatientRequest {
            name: "Jane".to_string(),
            email: "jane@test.com".to_string(),
            password: "secret".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            cellphone: Some(" ".to_string()),
        };

        assert_matches!(request.validate(), Err(PatientError::ValidationError(msg)) if msg == "Cellphone cannot be empty");
    }

    #[test]
    fn test_summary_reads_database_row() {
        let summary: PatientSummary = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "name": "Jane",
            "email": "jane@test.com",
            "birth_date": "1990-05-17",
            "cellphone": null
        }))
        .unwrap();

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["birthDate"], "1990-05-17");
    }

    #[test]
    fn test_referenced_patient_maps_to_conflict() {
        let err = AppError::from(PatientError::HasAppointments);
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
        assert_eq!(err.message(), "Patient still has appointments");
    }
}
