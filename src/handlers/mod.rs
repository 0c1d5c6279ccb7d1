pub mod persons;

use axum::response::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::services::PersonService;

/// Injected service handles shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PersonService>,
}

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Contacts API",
            "version": version,
            "description": "Person CRUD with photo attachments, built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "persons": "GET/POST /api/persons (token required)",
                "person": "GET/PUT /api/persons/:id (public), DELETE /api/persons/:id (token required)",
            }
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
