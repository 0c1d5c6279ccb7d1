pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod services;
pub mod storage;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use handlers::AppState;

/// Build the full application router over the given service handles.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Person resource
        .merge(person_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn person_routes() -> Router<AppState> {
    use handlers::persons;

    Router::new()
        // Collection: list requires a token, create takes multipart form data
        .route(
            "/api/persons",
            get(persons::list).post(persons::create),
        )
        // Individual: get and update are public, delete requires a token
        .route(
            "/api/persons/:id",
            get(persons::get)
                .put(persons::update)
                .delete(persons::delete),
        )
}
