use std::sync::Arc;
use axum::{middleware, routing::{get, patch, post}, Router};
use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_patient};

use crate::handlers::*;

pub fn patient_routes(config: Arc<AppConfig>) -> Router {
    let patient_only = Router::new()
        .route("/{id}", patch(update_patient).delete(delete_patient))
        .layer(middleware::from_fn(require_patient));

    let protected = Router::new()
        .route("/", get(list_patients))
        .route("/{id}", get(get_patient))
        .merge(patient_only)
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware));

    Router::new()
        .route("/", post(create_patient))
        .merge(protected)
        .with_state(config)
}
