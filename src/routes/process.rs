//! Image processing endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::ocr::TextBox;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProcessResponse {
    pub solution: Vec<TextBox>,
    pub status: &'static str,
}

/// POST /processImage/{request_id}
///
/// Suspends on the concurrency limiter until an OCR slot frees, then admits
/// the request: status flips to processing (exactly one of two concurrent
/// calls on the same id wins), the id leaves the queue, and the adapter runs
/// on a blocking worker. The permit is an RAII guard, so the slot is released
/// on every exit path including adapter failure.
pub async fn process_image(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<ProcessResponse>> {
    let request_id = Uuid::parse_str(&request_id)
        .map_err(|_| AppError::NotFoundOrExpired(request_id.clone()))?;

    let _permit = state
        .ocr_slots()
        .acquire()
        .await
        .map_err(|_| AppError::Internal("concurrency limiter closed".to_string()))?;

    let payload = state.store().begin_processing(request_id)?;
    state.queue().dequeue(request_id);

    tracing::info!(
        request_id = %request_id,
        payload_bytes = payload.len(),
        "Processing image"
    );

    let solution = state.adapter().detect(payload).await?;
    state.store().complete(request_id, solution.clone())?;

    tracing::info!(
        request_id = %request_id,
        boxes = solution.len(),
        "Image processed"
    );

    Ok(Json(ProcessResponse {
        solution,
        status: "solved",
    }))
}
