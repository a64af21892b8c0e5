use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::SharedStore;
use shared_models::error::AppError;
use shared_models::{PatientDraft, PatientId};

use crate::models::{PatientSearchQuery, UpdatePatientRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(store): State<SharedStore>,
    Json(request): Json<PatientDraft>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PatientService::new(store);

    let patient = service.create_patient(request).await?;

    Ok((StatusCode::CREATED, Json(json!(patient))))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(store): State<SharedStore>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);

    let details = service.get_patient(PatientId(patient_id)).await?;

    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(store): State<SharedStore>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);

    let patient = service
        .update_patient(PatientId(patient_id), request.patient, request.version)
        .await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(store): State<SharedStore>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);

    let outcome = service.delete_patient(PatientId(patient_id)).await?;

    Ok(Json(json!({ "outcome": outcome })))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(store): State<SharedStore>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);

    let patients: Vec<_> = service.search_patients(query.q.as_deref()).await?.collect();

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn list_patient_options(
    State(store): State<SharedStore>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);

    let options = service.list_patient_options().await?;

    Ok(Json(json!(options)))
}
