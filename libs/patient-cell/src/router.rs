use axum::{routing::get, Router};

use shared_database::SharedStore;

use crate::handlers::*;

pub fn patient_routes(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(search_patients).post(create_patient))
        .route("/options", get(list_patient_options))
        .route("/{id}", get(get_patient).put(update_patient).delete(delete_patient))
        .with_state(store)
}
