use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::{eq, ApiError, DatabaseClient};

use crate::models::{NewPatient, Patient, PatientChanges, PatientError};

const PATIENTS_PATH: &str = "/rest/v1/patients";
const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn create(&self, patient: NewPatient) -> Result<Patient, PatientError>;
    async fn find_all(&self) -> Result<Vec<Patient>, PatientError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, PatientError>;
    async fn find_by_email(&self, email: String) -> Result<Option<Patient>, PatientError>;
    async fn update(&self, id: Uuid, changes: PatientChanges) -> Result<Option<Patient>, PatientError>;
    async fn remove(&self, id: Uuid) -> Result<bool, PatientError>;
}

pub struct PostgrestPatientRepository {
    client: DatabaseClient,
}

impl PostgrestPatientRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: DatabaseClient::new(config),
        }
    }

    async fn find_one(&self, filter: &str) -> Result<Option<Patient>, PatientError> {
        let path = format!("{}?{}&limit=1", PATIENTS_PATH, filter);
        let rows: Vec<Value> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        rows.into_iter().next().map(parse_patient).transpose()
    }
}

/// A foreign key still pointing at the row surfaces as 409.
fn map_delete_error(err: anyhow::Error) -> PatientError {
    if ApiError::is_conflict(&err) {
        warn!("Store refused to delete a patient that is still referenced");
        PatientError::HasAppointments
    } else {
        PatientError::DatabaseError(err.to_string())
    }
}

fn parse_patient(row: Value) -> Result<Patient, PatientError> {
    serde_json::from_value(row)
        .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
}

#[async_trait]
impl PatientRepository for PostgrestPatientRepository {
    async fn create(&self, patient: NewPatient) -> Result<Patient, PatientError> {
        let now = Utc::now().to_rfc3339();
        let patient_data = json!({
            "name": patient.name,
            "email": patient.email,
            "birth_date": patient.birth_date,
            "cellphone": patient.cellphone,
            "password_hash": patient.password_hash,
            "created_at": now,
            "updated_at": now
        });

        let rows = self.client.write_returning(Method::POST, PATIENTS_PATH, Some(patient_data))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next()
            .ok_or_else(|| PatientError::DatabaseError("Failed to create patient".to_string()))?;
        parse_patient(row)
    }

    async fn find_all(&self) -> Result<Vec<Patient>, PatientError> {
        let path = format!("{}?order=name.asc", PATIENTS_PATH);
        let rows: Vec<Value> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(parse_patient).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, PatientError> {
        self.find_one(&format!("id={}", eq(id.to_string()))).await
    }

    async fn find_by_email(&self, email: String) -> Result<Option<Patient>, PatientError> {
        self.find_one(&format!("email={}", eq(&email))).await
    }

    async fn update(&self, id: Uuid, changes: PatientChanges) -> Result<Option<Patient>, PatientError> {
        let mut update_data = Map::new();
        if let Some(name) = changes.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(email) = changes.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(birth_date) = changes.birth_date {
            update_data.insert("birth_date".to_string(), json!(birth_date));
        }
        if let Some(cellphone) = changes.cellphone {
            update_data.insert("cellphone".to_string(), json!(cellphone));
        }
        if let Some(password_hash) = changes.password_hash {
            update_data.insert("password_hash".to_string(), json!(password_hash));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("{}?id={}", PATIENTS_PATH, eq(id.to_string()));
        let rows = self.client.write_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        rows.into_iter().next().map(parse_patient).transpose()
    }

    async fn remove(&self, id: Uuid) -> Result<bool, PatientError> {
        // Appointments go with the patient, whether or not the store cascades.
        let appointments = format!("{}?patient_id={}", APPOINTMENTS_PATH, eq(id.to_string()));
        let removed = self.client.write_returning(Method::DELETE, &appointments, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;
        debug!("Removed {} appointments of patient {}", removed.len(), id);

        let path = format!("{}?id={}", PATIENTS_PATH, eq(id.to_string()));
        let rows = self.client.write_returning(Method::DELETE, &path, None)
            .await
            .map_err(map_delete_error)?;

        Ok(!rows.is_empty())
    }
}
