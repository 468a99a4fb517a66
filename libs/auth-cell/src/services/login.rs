use std::sync::Arc;

use tracing::{debug, info, warn};

use doctor_cell::{DoctorRepository, PostgrestDoctorRepository};
use patient_cell::{PatientRepository, PostgrestPatientRepository};
use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, UserType};
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;
use shared_utils::password::verify_password;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid type")]
    InvalidUserType,

    #[error("Resource {0} not found")]
    UserNotFound(UserType),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidUserType => AppError::BadRequest(err.to_string()),
            AuthError::UserNotFound(_) => AppError::NotFound(err.to_string()),
            AuthError::AuthenticationFailed => AppError::Auth(err.to_string()),
            AuthError::TokenError(msg) => AppError::Internal(msg),
            AuthError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

/// Credentials as stored for either kind of account.
struct Account {
    id: String,
    password_hash: String,
}

pub struct AuthService {
    doctors: Arc<dyn DoctorRepository>,
    patients: Arc<dyn PatientRepository>,
    jwt_secret: String,
    expiration_hours: i64,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_repositories(
            config,
            Arc::new(PostgrestDoctorRepository::new(config)),
            Arc::new(PostgrestPatientRepository::new(config)),
        )
    }

    pub fn with_repositories(
        config: &AppConfig,
        doctors: Arc<dyn DoctorRepository>,
        patients: Arc<dyn PatientRepository>,
    ) -> Self {
        Self {
            doctors,
            patients,
            jwt_secret: config.jwt_secret.clone(),
            expiration_hours: config.jwt_expiration_hours,
        }
    }

    /// Verify credentials for the requested account type and issue a token.
    pub async fn login(&self, request: LoginRequest) -> Result<String, AuthError> {
        let user_type: UserType = request.user_type.parse()
            .map_err(|_| AuthError::InvalidUserType)?;
        debug!("Login attempt for {} {}", user_type, request.email);

        let account = self.find_account(user_type, request.email.clone()).await?
            .ok_or(AuthError::UserNotFound(user_type))?;

        // An unparseable stored hash is treated like a wrong password
        let matches = verify_password(&request.password, &account.password_hash)
            .map_err(|_| AuthError::AuthenticationFailed)?;
        if !matches {
            warn!("Failed login for {} {}", user_type, request.email);
            return Err(AuthError::AuthenticationFailed);
        }

        let token = issue_token(&account.id, user_type, &self.jwt_secret, self.expiration_hours)
            .map_err(AuthError::TokenError)?;

        info!("{} {} logged in", user_type, account.id);
        Ok(token)
    }

    async fn find_account(&self, user_type: UserType, email: String) -> Result<Option<Account>, AuthError> {
        let account = match user_type {
            UserType::Doctor => self.doctors.find_by_email(email)
                .await
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?
                .map(|doctor| Account {
                    id: doctor.id.to_string(),
                    password_hash: doctor.password_hash,
                }),
            UserType::Patient => self.patients.find_by_email(email)
                .await
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?
                .map(|patient| Account {
                    id: patient.id.to_string(),
                    password_hash: patient.password_hash,
                }),
        };
        Ok(account)
    }
}
