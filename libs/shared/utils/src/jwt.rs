use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

use shared_models::auth::{JwtClaims, User, UserType};

pub fn issue_token(
    user_id: &str,
    user_type: UserType,
    jwt_secret: &str,
    expiration_hours: i64,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        user_type,
        iat: now.timestamp() as u64,
        exp: (now + Duration::hours(expiration_hours)).timestamp() as u64,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to encode token: {}", e))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => {
            debug!("Token expired");
            "Token expired".to_string()
        }
        _ => {
            debug!("Token validation failed: {}", e);
            "Invalid token".to_string()
        }
    })?;

    let user = User {
        id: token_data.claims.sub,
        user_type: token_data.claims.user_type,
    };

    debug!("Token validated successfully for {} {}", user.user_type, user.id);
    Ok(user)
}
