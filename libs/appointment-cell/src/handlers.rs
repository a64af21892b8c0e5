// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::SharedStore;
use shared_models::error::AppError;
use shared_models::AppointmentId;

use crate::models::{ConflictCheckQuery, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::services::{AppointmentSchedulingService, ConflictDetectionService};

#[axum::debug_handler]
pub async fn list_appointments(
    State(store): State<SharedStore>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentSchedulingService::new(store);

    let appointments = service.list_appointments().await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(store): State<SharedStore>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AppointmentSchedulingService::new(store);

    let appointment = service.create_appointment(request.into()).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(store): State<SharedStore>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentSchedulingService::new(store);

    let listing = service.get_appointment(AppointmentId(appointment_id)).await?;

    Ok(Json(json!(listing)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(store): State<SharedStore>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentSchedulingService::new(store);

    let (draft, version) = request.into_parts();
    let appointment = service
        .update_appointment(AppointmentId(appointment_id), draft, version)
        .await?;

    Ok(Json(json!(appointment)))
}

/// Always succeeds for a well-formed id: deleting an absent appointment is a no-op.
#[axum::debug_handler]
pub async fn delete_appointment(
    State(store): State<SharedStore>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentSchedulingService::new(store);

    let outcome = service.delete_appointment(AppointmentId(appointment_id)).await?;

    Ok(Json(json!({ "outcome": outcome })))
}

#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(store): State<SharedStore>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ConflictDetectionService::new(store);

    let response = service
        .check_conflicts(query.patient_id, query.scheduled_at, query.exclude_appointment_id)
        .await?;

    Ok(Json(json!(response)))
}
