use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use curation::{Entry, ValidationResult};

use crate::error::{api_error, from_curation, from_join, ApiError};
use crate::state::SharedState;

/// Submission envelope. Both fields are required; they are optional here so a
/// missing one is reported as a 400 with a readable message.
#[derive(Deserialize)]
pub struct EntryRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub data: Option<Value>,
}

fn envelope(body: Result<Json<EntryRequest>, JsonRejection>) -> Result<(String, Value), ApiError> {
    let Json(req) = body.map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;
    let kind = req
        .kind
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing required field: type"))?;
    let data = req
        .data
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing required field: data"))?;
    Ok((kind, data))
}

pub async fn root() -> Json<Value> {
    Json(json!({"message": "Welcome to the LLM Data Curation API"}))
}

pub async fn list_entries(State(state): State<SharedState>) -> Json<Vec<Entry>> {
    let svc = state.curation.read().await;
    Json(svc.list().to_vec())
}

pub async fn get_entry(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Entry>, ApiError> {
    let svc = state.curation.read().await;
    svc.get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Entry not found"))
}

pub async fn create_entry(
    State(state): State<SharedState>,
    body: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let (kind, data) = envelope(body)?;

    let sub = state
        .mutate(move |svc| svc.submit(&kind, data))
        .await
        .map_err(from_join)?
        .map_err(from_curation)?;

    info!(
        id = %sub.id,
        score = sub.validation.quality_score,
        passes = sub.validation.passes,
        "entry created"
    );
    Ok(Json(json!({
        "id": sub.id,
        "message": "Entry added successfully",
        "validation": sub.validation,
    })))
}

pub async fn validate_entry(
    State(state): State<SharedState>,
    body: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError> {
    let (kind, data) = envelope(body)?;
    let svc = state.curation.read().await;
    svc.validate_only(&kind, &data).map(Json).map_err(from_curation)
}

pub async fn delete_entry(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = state
        .mutate(move |svc| svc.delete(&id))
        .await
        .map_err(from_join)?
        .map_err(from_curation)?;

    info!(id = %removed.id, "entry deleted");
    Ok(Json(json!({"message": "Entry deleted successfully"})))
}

pub async fn delete_all_entries(
    State(state): State<SharedState>,
) -> Result<Json<Value>, ApiError> {
    let cleared = state
        .mutate(|svc| svc.clear())
        .await
        .map_err(from_join)?
        .map_err(from_curation)?;

    info!(cleared = cleared, "all entries deleted");
    Ok(Json(json!({"message": "All entries deleted successfully"})))
}
