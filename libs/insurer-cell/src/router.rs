use axum::{routing::get, Router};

use shared_database::Database;

use crate::handlers;

pub fn insurer_routes(db: Database) -> Router {
    Router::new()
        .route("/", get(handlers::list_insurers))
        .route("/{id}", get(handlers::get_insurer))
        .route("/{id}/tariffs", get(handlers::list_tariffs))
        .with_state(db)
}
