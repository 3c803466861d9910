use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::Database;
use shared_models::AppError;

use crate::models::{CreatePatientRequest, PatientSearchQuery, UpdatePatientRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(db): State<Database>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(db);
    let patient = service.create_patient(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": patient
    })))
}

#[axum::debug_handler]
pub async fn list_patients(State(db): State<Database>) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(db);
    let patients = service.list_patients().await?;

    Ok(Json(json!({
        "success": true,
        "data": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(db): State<Database>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(db);
    let patients = service.search_patients(query).await?;

    Ok(Json(json!({
        "success": true,
        "data": patients,
        "total": patients.len()
    })))
}

/// Patient card: the record plus its insurer, treating doctor, recent
/// appointments and full authorization ledger.
#[axum::debug_handler]
pub async fn get_patient(
    State(db): State<Database>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(db);
    let patient = service.get_patient(patient_id).await?;

    let insurer = match patient.insurer_id {
        Some(id) => service.insurer_summary(id).await?,
        None => None,
    };
    let treating_doctor = match patient.treating_doctor_id {
        Some(id) => service.doctor_summary(id).await?,
        None => None,
    };
    let appointments = service.recent_appointments(patient_id, 10).await?;
    let authorizations = service.authorization_history(patient_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": patient,
        "insurer": insurer,
        "treating_doctor": treating_doctor,
        "recent_appointments": appointments,
        "authorizations": authorizations
    })))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(db): State<Database>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(db);
    service.delete_patient(patient_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Patient deleted"
    })))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(db): State<Database>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(db);
    let patient = service.update_patient(patient_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": patient
    })))
}
