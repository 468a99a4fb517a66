use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::password::hash_password;

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorChanges, DoctorError, NewDoctor, UpdateDoctorRequest,
};
use crate::services::repository::{DoctorRepository, PostgrestDoctorRepository};

pub struct DoctorService {
    repository: Arc<dyn DoctorRepository>,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repository: Arc::new(PostgrestDoctorRepository::new(config)),
        }
    }

    pub fn with_repository(repository: Arc<dyn DoctorRepository>) -> Self {
        Self { repository }
    }

    /// Register a new doctor. CRM and email must both be unused.
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating new doctor profile for: {}", request.email);
        request.validate()?;

        let existing_crm = self.repository.find_by_crm(request.crm).await?;
        let existing_email = self.repository.find_by_email(request.email.clone()).await?;

        if existing_crm.is_some() {
            warn!("Rejected doctor registration: CRM {} already in use", request.crm);
            return Err(DoctorError::CrmAlreadyExists);
        }
        if existing_email.is_some() {
            warn!("Rejected doctor registration: email {} already in use", request.email);
            return Err(DoctorError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| DoctorError::PasswordHashError(e.to_string()))?;

        let doctor = self.repository.create(NewDoctor {
            name: request.name,
            email: request.email,
            crm: request.crm,
            specialty: request.specialty,
            password_hash,
        }).await?;

        info!("Doctor profile created successfully with ID: {}", doctor.id);
        Ok(doctor)
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors");
        self.repository.find_all().await
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);
        self.repository.find_by_id(doctor_id).await?
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);
        request.validate()?;

        let existing = self.get_doctor(doctor_id).await?;

        if let Some(crm) = request.crm.filter(|crm| *crm != existing.crm) {
            if let Some(other) = self.repository.find_by_crm(crm).await? {
                if other.id != doctor_id {
                    return Err(DoctorError::CrmAlreadyExists);
                }
            }
        }

        if let Some(email) = request.email.as_ref().filter(|email| **email != existing.email) {
            if let Some(other) = self.repository.find_by_email(email.clone()).await? {
                if other.id != doctor_id {
                    return Err(DoctorError::EmailAlreadyExists);
                }
            }
        }

        let password_hash = request.password.as_deref()
            .map(hash_password)
            .transpose()
            .map_err(|e| DoctorError::PasswordHashError(e.to_string()))?;

        let changes = DoctorChanges {
            name: request.name,
            email: request.email,
            crm: request.crm,
            specialty: request.specialty,
            password_hash,
        };

        self.repository.update(doctor_id, changes).await?
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        debug!("Deleting doctor: {}", doctor_id);
        self.get_doctor(doctor_id).await?;

        if !self.repository.remove(doctor_id).await? {
            return Err(DoctorError::NotFound(doctor_id));
        }

        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use mockall::predicate::eq;
    use tokio_test::assert_ok;

    use crate::services::repository::MockDoctorRepository;

    fn doctor(id: Uuid, crm: i32, email: &str) -> Doctor {
        Doctor {
            id,
            name: "Dr. Test".to_string(),
            email: email.to_string(),
            crm,
            specialty: "Cardiology".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_request() -> CreateDoctorRequest {
        CreateDoctorRequest {
            name: "Dr. Test".to_string(),
            email: "doctor@test.com".to_string(),
            password: "plain-password".to_string(),
            crm: 123456,
            specialty: "Cardiology".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_doctor_hashes_password() {
        let mut repository = MockDoctorRepository::new();
        repository.expect_find_by_crm().returning(|_| Ok(None));
        repository.expect_find_by_email().returning(|_| Ok(None));
        repository.expect_create()
            .withf(|new_doctor| {
                new_doctor.password_hash != "plain-password"
                    && new_doctor.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|new_doctor| Ok(doctor(Uuid::new_v4(), new_doctor.crm, &new_doctor.email)));

        let service = DoctorService::with_repository(Arc::new(repository));
        let created = service.create_doctor(create_request()).await.unwrap();

        assert_eq!(created.crm, 123456);
    }

    #[tokio::test]
    async fn test_create_doctor_rejects_duplicate_crm_before_email() {
        let mut repository = MockDoctorRepository::new();
        repository.expect_find_by_crm()
            .with(eq(123456))
            .returning(|crm| Ok(Some(doctor(Uuid::new_v4(), crm, "other@test.com"))));
        repository.expect_find_by_email()
            .returning(|email| Ok(Some(doctor(Uuid::new_v4(), 1, &email))));
        repository.expect_create().never();

        let service = DoctorService::with_repository(Arc::new(repository));
        let result = service.create_doctor(create_request()).await;

        assert_matches!(result, Err(DoctorError::CrmAlreadyExists));
    }

    #[tokio::test]
    async fn test_create_doctor_rejects_duplicate_email() {
        let mut repository = MockDoctorRepository::new();
        repository.expect_find_by_crm().returning(|_| Ok(None));
        repository.expect_find_by_email()
            .returning(|email| Ok(Some(doctor(Uuid::new_v4(), 1, &email))));
        repository.expect_create().never();

        let service = DoctorService::with_repository(Arc::new(repository));
        let result = service.create_doctor(create_request()).await;

        assert_matches!(result, Err(DoctorError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn test_update_doctor_rejects_crm_of_another_doctor() {
        let doctor_id = Uuid::new_v4();
        let mut repository = MockDoctorRepository::new();
        repository.expect_find_by_id()
            .with(eq(doctor_id))
            .returning(move |id| Ok(Some(doctor(id, 111, "doctor@test.com"))));
        repository.expect_find_by_crm()
            .with(eq(222))
            .returning(|crm| Ok(Some(doctor(Uuid::new_v4(), crm, "other@test.com"))));
        repository.expect_update().never();

        let service = DoctorService::with_repository(Arc::new(repository));
        let request = UpdateDoctorRequest { crm: Some(222), ..Default::default() };
        let result = service.update_doctor(doctor_id, request).await;

        assert_matches!(result, Err(DoctorError::CrmAlreadyExists));
    }

    #[tokio::test]
    async fn test_update_doctor_with_same_crm_skips_uniqueness_lookup() {
        let doctor_id = Uuid::new_v4();
        let mut repository = MockDoctorRepository::new();
        repository.expect_find_by_id()
            .returning(move |id| Ok(Some(doctor(id, 111, "doctor@test.com"))));
        repository.expect_find_by_crm().never();
        repository.expect_update()
            .withf(|_, changes| changes.name.as_deref() == Some("Dr. Renamed") && changes.password_hash.is_none())
            .returning(move |id, _| Ok(Some(doctor(id, 111, "doctor@test.com"))));

        let service = DoctorService::with_repository(Arc::new(repository));
        let request = UpdateDoctorRequest {
            name: Some("Dr. Renamed".to_string()),
            crm: Some(111),
            ..Default::default()
        };

        assert_ok!(service.update_doctor(doctor_id, request).await);
    }

    #[tokio::test]
    async fn test_delete_missing_doctor() {
        let mut repository = MockDoctorRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));
        repository.expect_remove().never();

        let service = DoctorService::with_repository(Arc::new(repository));
        let result = service.delete_doctor(Uuid::new_v4()).await;

        assert_matches!(result, Err(DoctorError::NotFound(_)));
    }
}
