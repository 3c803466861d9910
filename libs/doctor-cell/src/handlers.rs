use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::Database;
use shared_models::AppError;

use crate::models::CreateDoctorRequest;
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn create_doctor(
    State(db): State<Database>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(db);
    let doctor = service.create_doctor(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": doctor
    })))
}

#[axum::debug_handler]
pub async fn list_doctors(State(db): State<Database>) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(db);
    let doctors = service.list_doctors().await?;

    Ok(Json(json!({
        "success": true,
        "data": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(db): State<Database>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(db);
    let doctor = service.get_doctor(doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": doctor
    })))
}
