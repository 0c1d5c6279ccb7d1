use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::Value;
use uuid::Uuid;

use crate::auth;
use crate::database::models::Person;
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::services::person_service::UploadedImage;

/// Multipart field holding the photo payload.
const FILE_FIELD: &str = "file";

fn require_bearer(headers: &HeaderMap) -> Result<auth::Claims, ApiError> {
    auth::verify_bearer(headers).map_err(|reason| {
        tracing::debug!("rejected bearer credential: {}", reason);
        ApiError::unauthorized("Token missing or invalid")
    })
}

/// Caller identity for the public endpoints: used only when an ownership
/// policy is enforced, so verification failures read as anonymous.
fn optional_bearer(headers: &HeaderMap) -> Option<Uuid> {
    auth::verify_bearer(headers).ok().map(|claims| claims.id)
}

/// GET /api/persons - List the caller's persons
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Person>>, ApiError> {
    let claims = require_bearer(&headers)?;
    let persons = state.service.list(claims.id).await?;
    Ok(Json(persons))
}

/// GET /api/persons/:id - Fetch one person
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Person>, ApiError> {
    let caller = optional_bearer(&headers);
    let person = state.service.get(id, caller).await?;
    Ok(Json(person))
}

/// POST /api/persons - Create a person from multipart form data
/// (fields: name, number, file)
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_bearer(&headers)?;

    let mut name: Option<String> = None;
    let mut number: Option<String> = None;
    let mut image: Option<UploadedImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => {
                name = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Invalid name field: {}", e))
                })?);
            }
            Some("number") => {
                number = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Invalid number field: {}", e))
                })?);
            }
            Some(FILE_FIELD) => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid file field: {}", e)))?
                    .to_vec();
                image = Some(UploadedImage {
                    original_name,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ApiError::bad_request("Content is missing"))?;
    let number = number.ok_or_else(|| ApiError::bad_request("Content is missing"))?;
    let image = image.ok_or_else(|| ApiError::bad_request("Image file is required"))?;

    let person = state.service.create(claims.id, &name, &number, image).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// PUT /api/persons/:id - Update name and number
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Person>, ApiError> {
    let caller = optional_bearer(&headers);
    let person = state.service.update(id, &body, caller).await?;
    Ok(Json(person))
}

/// DELETE /api/persons/:id - Delete a person and its stored photo
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let claims = require_bearer(&headers)?;
    state.service.delete(id, claims.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
