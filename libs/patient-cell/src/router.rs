use axum::{
    routing::{delete, get, post, put},
    Router,
};

use shared_database::Database;

use crate::handlers;

pub fn patient_routes(db: Database) -> Router {
    Router::new()
        .route("/", post(handlers::create_patient))
        .route("/", get(handlers::list_patients))
        .route("/search", get(handlers::search_patients))
        .route("/{id}", get(handlers::get_patient))
        .route("/{id}", put(handlers::update_patient))
        .route("/{id}", delete(handlers::delete_patient))
        .with_state(db)
}
