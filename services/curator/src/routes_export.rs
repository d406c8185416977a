use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use curation::DatasetStats;

use crate::error::{from_curation, ApiError};
use crate::state::SharedState;

fn attachment(content_type: &'static str, filename: &'static str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename={filename}")),
        ],
        body,
    )
        .into_response()
}

pub async fn download_json(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let body = state.curation.read().await.export_json().map_err(from_curation)?;
    Ok(attachment("application/json", "llm-dataset.json", body))
}

pub async fn download_jsonl(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let body = state.curation.read().await.export_jsonl().map_err(from_curation)?;
    Ok(attachment("application/jsonlines", "llm-dataset.jsonl", body))
}

pub async fn get_stats(State(state): State<SharedState>) -> Result<Json<DatasetStats>, ApiError> {
    let stats = state.curation.read().await.stats().map_err(from_curation)?;
    Ok(Json(stats))
}
