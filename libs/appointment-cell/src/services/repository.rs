use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::{eq, neq, ApiError, DatabaseClient};

use crate::models::{Appointment, AppointmentChanges, AppointmentError, NewAppointment};

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

/// Loads the doctor and patient alongside each appointment row.
const APPOINTMENT_SELECT: &str =
    "*,doctor:doctors(id,name,email,crm,specialty),patient:patients(id,name,email,birth_date,cellphone)";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError>;
    async fn find_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError>;
    async fn find_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError>;
    /// Ids of appointments stored for the doctor at exactly this date and hour.
    async fn find_in_slot(
        &self,
        doctor_id: Uuid,
        date: String,
        hour: String,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Uuid>, AppointmentError>;
    async fn update(&self, id: Uuid, changes: AppointmentChanges) -> Result<Option<Appointment>, AppointmentError>;
    async fn remove(&self, id: Uuid) -> Result<bool, AppointmentError>;
}

pub struct PostgrestAppointmentRepository {
    client: DatabaseClient,
}

#[derive(Deserialize)]
struct IdRow {
    id: Uuid,
}

impl PostgrestAppointmentRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: DatabaseClient::new(config),
        }
    }

    async fn select(&self, filter: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("{}?select={}&{}", APPOINTMENTS_PATH, APPOINTMENT_SELECT, filter);
        let rows: Vec<Value> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(parse_appointment).collect()
    }

    async fn write(&self, method: Method, path: &str, body: Option<Value>) -> Result<Vec<Value>, AppointmentError> {
        self.client.write_returning(method, path, body)
            .await
            .map_err(map_write_error)
    }
}

fn parse_appointment(row: Value) -> Result<Appointment, AppointmentError> {
    serde_json::from_value(row)
        .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
}

/// A uniqueness violation on (doctor_id, date, hour) surfaces as 409.
fn map_write_error(err: anyhow::Error) -> AppointmentError {
    if ApiError::is_conflict(&err) {
        warn!("Store rejected appointment write as duplicate slot");
        AppointmentError::AppointmentConflict
    } else {
        AppointmentError::DatabaseError(err.to_string())
    }
}

#[async_trait]
impl AppointmentRepository for PostgrestAppointmentRepository {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let now = Utc::now().to_rfc3339();
        let appointment_data = json!({
            "date": appointment.date,
            "hour": appointment.hour,
            "doctor_id": appointment.doctor_id,
            "patient_id": appointment.patient_id,
            "created_at": now,
            "updated_at": now
        });

        let path = format!("{}?select={}", APPOINTMENTS_PATH, APPOINTMENT_SELECT);
        let rows = self.write(Method::POST, &path, Some(appointment_data)).await?;

        let row = rows.into_iter().next()
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))?;
        parse_appointment(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let appointments = self.select(&format!("id={}&limit=1", eq(id.to_string()))).await?;
        Ok(appointments.into_iter().next())
    }

    async fn find_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        self.select(&format!("doctor_id={}&order=created_at.asc", eq(doctor_id.to_string()))).await
    }

    async fn find_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        self.select(&format!("patient_id={}&order=created_at.asc", eq(patient_id.to_string()))).await
    }

    async fn find_in_slot(
        &self,
        doctor_id: Uuid,
        date: String,
        hour: String,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Uuid>, AppointmentError> {
        let mut path = format!(
            "{}?select=id&doctor_id={}&date={}&hour={}",
            APPOINTMENTS_PATH,
            eq(doctor_id.to_string()),
            eq(&date),
            eq(&hour)
        );
        if let Some(exclude) = exclude {
            path.push_str(&format!("&id={}", neq(exclude.to_string())));
        }

        debug!("Looking up slot {} {} for doctor {}", date, hour, doctor_id);
        let rows: Vec<IdRow> = self.client.request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn update(&self, id: Uuid, changes: AppointmentChanges) -> Result<Option<Appointment>, AppointmentError> {
        let mut update_data = Map::new();
        if let Some(date) = changes.date {
            update_data.insert("date".to_string(), json!(date));
        }
        if let Some(hour) = changes.hour {
            update_data.insert("hour".to_string(), json!(hour));
        }
        if let Some(doctor_id) = changes.doctor_id {
            update_data.insert("doctor_id".to_string(), json!(doctor_id));
        }
        if let Some(patient_id) = changes.patient_id {
            update_data.insert("patient_id".to_string(), json!(patient_id));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!(
            "{}?id={}&select={}",
            APPOINTMENTS_PATH,
            eq(id.to_string()),
            APPOINTMENT_SELECT
        );
        let rows = self.write(Method::PATCH, &path, Some(Value::Object(update_data))).await?;

        rows.into_iter().next().map(parse_appointment).transpose()
    }

    async fn remove(&self, id: Uuid) -> Result<bool, AppointmentError> {
        let path = format!("{}?id={}&select=id", APPOINTMENTS_PATH, eq(id.to_string()));
        let rows = self.write(Method::DELETE, &path, None).await?;

        Ok(!rows.is_empty())
    }
}
