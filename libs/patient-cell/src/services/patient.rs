use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::password::hash_password;

use crate::models::{
    CreatePatientRequest, NewPatient, Patient, PatientChanges, PatientError, UpdatePatientRequest,
};
use crate::services::repository::{PatientRepository, PostgrestPatientRepository};

pub struct PatientService {
    repository: Arc<dyn PatientRepository>,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repository: Arc::new(PostgrestPatientRepository::new(config)),
        }
    }

    pub fn with_repository(repository: Arc<dyn PatientRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Creating patient: {}", request.email);
        request.validate()?;

        if self.repository.find_by_email(request.email.clone()).await?.is_some() {
            warn!("Rejected patient registration: email {} already in use", request.email);
            return Err(PatientError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| PatientError::PasswordHashError(e.to_string()))?;

        let patient = self.repository.create(NewPatient {
            name: request.name,
            email: request.email,
            birth_date: request.birth_date,
            cellphone: request.cellphone,
            password_hash,
        }).await?;

        info!("Patient created with ID: {}", patient.id);
        Ok(patient)
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        self.repository.find_all().await
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);
        self.repository.find_by_id(patient_id).await?
            .ok_or(PatientError::NotFound(patient_id))
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient: {}", patient_id);
        request.validate()?;

        let existing = self.get_patient(patient_id).await?;

        if let Some(email) = request.email.as_ref().filter(|email| **email != existing.email) {
            if self.repository.find_by_email(email.clone()).await?.is_some() {
                return Err(PatientError::EmailAlreadyExists);
            }
        }

        let password_hash = request.password.as_deref()
            .map(hash_password)
            .transpose()
            .map_err(|e| PatientError::PasswordHashError(e.to_string()))?;

        let changes = PatientChanges {
            name: request.name,
            email: request.email,
            birth_date: request.birth_date,
            cellphone: request.cellphone,
            password_hash,
        };

        self.repository.update(patient_id, changes).await?
            .ok_or(PatientError::NotFound(patient_id))
    }

    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        self.get_patient(patient_id).await?;

        if !self.repository.remove(patient_id).await? {
            return Err(PatientError::NotFound(patient_id));
        }

        info!("Patient {} deleted", patient_id);
        Ok(())
    }
}
