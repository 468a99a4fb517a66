use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{JwtClaims, User, UserType};

use crate::clock::Clock;

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub database_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            database_url: "http://localhost:54321".to_string(),
            database_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_database_url(url: &str) -> Self {
        Self {
            database_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database_url.clone(),
            database_api_key: self.database_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expiration_hours: 24,
            port: 9001,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
}

impl TestUser {
    pub fn new(email: &str, user_type: UserType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            user_type,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, UserType::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, UserType::Patient)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            user_type: self.user_type,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let claims = JwtClaims {
            sub: user.id.clone(),
            user_type: user.user_type,
            iat: now.timestamp() as u64,
            exp: exp.timestamp() as u64,
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .expect("HMAC can take key of any size")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }

    pub fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Accepts `YYYY-MM-DDTHH:MM:SS`.
    pub fn at(timestamp: &str) -> Self {
        let now = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S")
            .expect("timestamp must be YYYY-MM-DDTHH:MM:SS");
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

pub struct MockDatabaseResponses;

impl MockDatabaseResponses {
    pub fn doctor_response(doctor_id: &str, email: &str, name: &str, crm: i32) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "name": name,
            "email": email,
            "crm": crm,
            "specialty": "Cardiology",
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_response(patient_id: &str, email: &str, name: &str) -> serde_json::Value {
        json!({
            "id": patient_id,
            "name": name,
            "email": email,
            "birth_date": "1990-01-01",
            "cellphone": "+1234567890",
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        appointment_id: &str,
        doctor_id: &str,
        patient_id: &str,
        date: &str,
        hour: &str,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "date": date,
            "hour": hour,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "doctor": {
                "id": doctor_id,
                "name": "Dr. Test",
                "email": "doctor@test.com",
                "crm": 123456,
                "specialty": "Cardiology"
            },
            "patient": {
                "id": patient_id,
                "name": "Patient Test",
                "email": "patient@test.com",
                "birth_date": "1990-01-01",
                "cellphone": "+1234567890"
            },
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
