use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::{eq, ApiError, DatabaseClient};

use crate::models::{Doctor, DoctorChanges, DoctorError, NewDoctor};

const DOCTORS_PATH: &str = "/rest/v1/doctors";
const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

/// Storage operations the doctor service depends on.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn create(&self, doctor: NewDoctor) -> Result<Doctor, DoctorError>;
    async fn find_all(&self) -> Result<Vec<Doctor>, DoctorError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>, DoctorError>;
    async fn find_by_email(&self, email: String) -> Result<Option<Doctor>, DoctorError>;
    async fn find_by_crm(&self, crm: i32) -> Result<Option<Doctor>, DoctorError>;
    async fn update(&self, id: Uuid, changes: DoctorChanges) -> Result<Option<Doctor>, DoctorError>;
    /// Returns whether a row was deleted.
    async fn remove(&self, id: Uuid) -> Result<bool, DoctorError>;
}

pub struct PostgrestDoctorRepository {
    client: DatabaseClient,
}

impl PostgrestDoctorRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: DatabaseClient::new(config),
        }
    }

    async fn find_one(&self, filter: &str) -> Result<Option<Doctor>, DoctorError> {
        let path = format!("{}?{}&limit=1", DOCTORS_PATH, filter);
        let rows: Vec<Value> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        rows.into_iter().next().map(parse_doctor).transpose()
    }
}

/// A foreign key still pointing at the row surfaces as 409.
fn map_delete_error(err: anyhow::Error) -> DoctorError {
    if ApiError::is_conflict(&err) {
        warn!("Store refused to delete a doctor that is still referenced");
        DoctorError::HasAppointments
    } else {
        DoctorError::DatabaseError(err.to_string())
    }
}

fn parse_doctor(row: Value) -> Result<Doctor, DoctorError> {
    serde_json::from_value(row)
        .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
}

#[async_trait]
impl DoctorRepository for PostgrestDoctorRepository {
    async fn create(&self, doctor: NewDoctor) -> Result<Doctor, DoctorError> {
        let now = Utc::now().to_rfc3339();
        let doctor_data = json!({
            "name": doctor.name,
            "email": doctor.email,
            "crm": doctor.crm,
            "specialty": doctor.specialty,
            "password_hash": doctor.password_hash,
            "created_at": now,
            "updated_at": now
        });

        let rows = self.client.write_returning(Method::POST, DOCTORS_PATH, Some(doctor_data))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next()
            .ok_or_else(|| DoctorError::DatabaseError("Failed to create doctor".to_string()))?;
        parse_doctor(row)
    }

    async fn find_all(&self) -> Result<Vec<Doctor>, DoctorError> {
        let path = format!("{}?order=name.asc", DOCTORS_PATH);
        let rows: Vec<Value> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(parse_doctor).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>, DoctorError> {
        self.find_one(&format!("id={}", eq(id.to_string()))).await
    }

    async fn find_by_email(&self, email: String) -> Result<Option<Doctor>, DoctorError> {
        self.find_one(&format!("email={}", eq(&email))).await
    }

    async fn find_by_crm(&self, crm: i32) -> Result<Option<Doctor>, DoctorError> {
        self.find_one(&format!("crm={}", eq(crm.to_string()))).await
    }

    async fn update(&self, id: Uuid, changes: DoctorChanges) -> Result<Option<Doctor>, DoctorError> {
        debug!("Updating doctor record {}", id);

        let mut update_data = serde_json::Map::new();
        if let Some(name) = changes.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(email) = changes.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(crm) = changes.crm {
            update_data.insert("crm".to_string(), json!(crm));
        }
        if let Some(specialty) = changes.specialty {
            update_data.insert("specialty".to_string(), json!(specialty));
        }
        if let Some(password_hash) = changes.password_hash {
            update_data.insert("password_hash".to_string(), json!(password_hash));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("{}?id={}", DOCTORS_PATH, eq(id.to_string()));
        let rows = self.client.write_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        rows.into_iter().next().map(parse_doctor).transpose()
    }

    async fn remove(&self, id: Uuid) -> Result<bool, DoctorError> {
        // Appointments go with the doctor, whether or not the store cascades.
        let appointments = format!("{}?doctor_id={}", APPOINTMENTS_PATH, eq(id.to_string()));
        let removed = self.client.write_returning(Method::DELETE, &appointments, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;
        debug!("Removed {} appointments of doctor {}", removed.len(), id);

        let path = format!("{}?id={}", DOCTORS_PATH, eq(id.to_string()));
        let rows = self.client.write_returning(Method::DELETE, &path, None)
            .await
            .map_err(map_delete_error)?;

        Ok(!rows.is_empty())
    }
}
