use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use shared_database::Database;

use crate::handlers;

pub fn appointment_routes(db: Database) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/", get(handlers::search_appointments))
        .route("/{id}", get(handlers::get_appointment))
        .route("/{id}", put(handlers::update_appointment))
        .route("/{id}", delete(handlers::delete_appointment))
        .route("/{id}/status", patch(handlers::update_appointment_status))
        .with_state(db)
}
