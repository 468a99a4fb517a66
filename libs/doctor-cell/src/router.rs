use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_doctor};

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // Registration is open
    let public_routes = Router::new()
        .route("/", post(handlers::create_doctor));

    // Only doctors may modify doctor records
    let doctor_only_routes = Router::new()
        .route(
            "/{doctor_id}",
            patch(handlers::update_doctor).delete(handlers::delete_doctor),
        )
        .layer(middleware::from_fn(require_doctor));

    let protected_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .merge(doctor_only_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
