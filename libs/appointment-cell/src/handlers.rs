use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::Database;
use shared_models::AppError;

use crate::models::{
    AppointmentSearchQuery, CreateAppointmentRequest, UpdateAppointmentRequest,
    UpdateAppointmentStatusRequest,
};
use crate::services::AppointmentService;

#[axum::debug_handler]
pub async fn book_appointment(
    State(db): State<Database>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(db);
    let appointment = service.create_appointment(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": appointment
    })))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(db): State<Database>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(db);
    let appointments = service.search_appointments(query).await?;

    Ok(Json(json!({
        "success": true,
        "data": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(db): State<Database>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(db);
    let appointment = service.get_appointment(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(db): State<Database>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(db);
    let appointment = service.update_appointment(appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(db): State<Database>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(db);
    let appointment = service.update_status(appointment_id, request.status).await?;

    Ok(Json(json!({
        "success": true,
        "data": appointment
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(db): State<Database>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(db);
    service.delete_appointment(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment deleted"
    })))
}
