use axum::{
    routing::{get, post},
    Router,
};

use shared_database::Database;

use crate::handlers;

pub fn doctor_routes(db: Database) -> Router {
    Router::new()
        .route("/", post(handlers::create_doctor))
        .route("/", get(handlers::list_doctors))
        .route("/{id}", get(handlers::get_doctor))
        .with_state(db)
}
