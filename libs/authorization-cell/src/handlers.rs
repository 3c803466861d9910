use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::Database;
use shared_models::AppError;

use crate::models::{
    AuthorizationSearchQuery, CreateAuthorizationRequest, UpdateAuthorizationRequest,
    UpdateAuthorizationStatusRequest,
};
use crate::services::AuthorizationService;

#[axum::debug_handler]
pub async fn create_authorization(
    State(db): State<Database>,
    Json(request): Json<CreateAuthorizationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AuthorizationService::new(db);

    let authorization = service.create_authorization(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": authorization
    })))
}

#[axum::debug_handler]
pub async fn get_authorization(
    State(db): State<Database>,
    Path(authorization_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AuthorizationService::new(db);

    let authorization = service.get_authorization(authorization_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": authorization
    })))
}

#[axum::debug_handler]
pub async fn search_authorizations(
    State(db): State<Database>,
    Query(query): Query<AuthorizationSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AuthorizationService::new(db);

    let authorizations = service.search_authorizations(query).await?;

    Ok(Json(json!({
        "success": true,
        "data": authorizations,
        "total": authorizations.len()
    })))
}

#[axum::debug_handler]
pub async fn update_authorization(
    State(db): State<Database>,
    Path(authorization_id): Path<Uuid>,
    Json(request): Json<UpdateAuthorizationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AuthorizationService::new(db);

    let authorization = service
        .update_authorization(authorization_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": authorization
    })))
}

#[axum::debug_handler]
pub async fn update_authorization_status(
    State(db): State<Database>,
    Path(authorization_id): Path<Uuid>,
    Json(request): Json<UpdateAuthorizationStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AuthorizationService::new(db);

    let authorization = service
        .update_status(authorization_id, request.status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": authorization
    })))
}
