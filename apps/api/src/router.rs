use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use authorization_cell::router::authorization_routes;
use doctor_cell::router::doctor_routes;
use insurer_cell::router::insurer_routes;
use patient_cell::router::patient_routes;
use shared_database::Database;

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic API is running!" }))
        .route("/health", get(health).with_state(db.clone()))
        .nest("/patients", patient_routes(db.clone()))
        .nest("/doctors", doctor_routes(db.clone()))
        .nest("/insurers", insurer_routes(db.clone()))
        .nest("/authorizations", authorization_routes(db.clone()))
        .nest("/appointments", appointment_routes(db))
}

async fn health(State(db): State<Database>) -> Json<Value> {
    let database = if db.is_healthy().await { "up" } else { "down" };
    Json(json!({
        "status": "ok",
        "database": database
    }))
}
