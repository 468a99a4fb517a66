use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, UpdatePatientRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient = PatientService::new(&state).create_patient(request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": patient }))))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let patients = PatientService::new(&state).list_patients().await?;
    Ok(Json(json!({ "data": patients })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(&state).get_patient(id).await?;
    Ok(Json(json!({ "data": patient })))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(&state).update_patient(id, request).await?;
    Ok(Json(json!({ "data": patient })))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    PatientService::new(&state).delete_patient(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
