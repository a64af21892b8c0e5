// libs/appointment-cell/src/router.rs
use axum::{routing::get, Router};

use shared_database::SharedStore;

use crate::handlers;

pub fn appointment_routes(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments).post(handlers::create_appointment))
        .route("/conflicts/check", get(handlers::check_appointment_conflicts))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .with_state(store)
}
