use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::Database;
use shared_models::AppError;

use crate::services::InsurerService;

#[axum::debug_handler]
pub async fn list_insurers(State(db): State<Database>) -> Result<Json<Value>, AppError> {
    let service = InsurerService::new(db);
    let insurers = service.list_insurers().await?;

    Ok(Json(json!({
        "success": true,
        "data": insurers,
        "total": insurers.len()
    })))
}

#[axum::debug_handler]
pub async fn get_insurer(
    State(db): State<Database>,
    Path(insurer_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InsurerService::new(db);
    let insurer = service.get_insurer(insurer_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": insurer
    })))
}

#[axum::debug_handler]
pub async fn list_tariffs(
    State(db): State<Database>,
    Path(insurer_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InsurerService::new(db);
    let tariffs = service.list_tariffs(insurer_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": tariffs,
        "total": tariffs.len()
    })))
}
