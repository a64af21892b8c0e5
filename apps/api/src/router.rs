use axum::{routing::get, Router};

use appointment_cell::appointment_routes;
use patient_cell::patient_routes;
use shared_database::SharedStore;

pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/patients", patient_routes(store.clone()))
        .nest("/appointments", appointment_routes(store))
}
