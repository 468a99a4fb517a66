use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::jwt::validate_token;

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !request.headers().contains_key(AUTHORIZATION) {
        return Err(AppError::Auth("Token is missing".to_string()));
    }

    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(bearer.token(), &config.jwt_secret)
        .map_err(|_| AppError::Auth("Invalid token".to_string()))?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn current_user(request: &Request<Body>) -> Result<&User, AppError> {
    request
        .extensions()
        .get::<User>()
        .ok_or_else(|| AppError::Auth("User not found in request extensions".to_string()))
}

/// Must be layered inside `auth_middleware`.
pub async fn require_doctor(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    if !current_user(&request)?.is_doctor() {
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }
    Ok(next.run(request).await)
}

/// Must be layered inside `auth_middleware`.
pub async fn require_patient(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    if !current_user(&request)?.is_patient() {
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }
    Ok(next.run(request).await)
}
