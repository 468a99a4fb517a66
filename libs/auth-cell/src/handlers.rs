use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::LoginRequest;
use shared_models::error::AppError;

use crate::services::AuthService;

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Handling login request");

    let token = AuthService::new(&config).login(request).await?;

    Ok(Json(json!({ "data": token })))
}
