use axum::{
    routing::{get, patch, post, put},
    Router,
};

use shared_database::Database;

use crate::handlers::*;

pub fn authorization_routes(db: Database) -> Router {
    Router::new()
        .route("/", post(create_authorization))
        .route("/", get(search_authorizations))
        .route("/{id}", get(get_authorization))
        .route("/{id}", put(update_authorization))
        .route("/{id}/status", patch(update_authorization_status))
        .with_state(db)
}
