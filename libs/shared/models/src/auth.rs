use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Doctor,
    Patient,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Doctor => write!(f, "doctor"),
            UserType::Patient => write!(f, "patient"),
        }
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(UserType::Doctor),
            "patient" => Ok(UserType::Patient),
            other => Err(format!("Unknown user type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub iat: u64,
    pub exp: u64,
}

/// Authenticated principal placed in request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub user_type: UserType,
}

impl User {
    pub fn is_doctor(&self) -> bool {
        self.user_type == UserType::Doctor
    }

    pub fn is_patient(&self) -> bool {
        self.user_type == UserType::Patient
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: String,
}
