//! Image upload endpoint

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub request_id: Uuid,
    pub message: &'static str,
}

/// POST /uploadImage
///
/// Accepts raw image bytes, assigns a request id, and appends it to the
/// admission queue. Oversized payloads are rejected before any state is
/// touched, so a rejected upload leaves the queue unchanged.
pub async fn upload_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>> {
    let max = state.config().server.max_upload_bytes;
    if body.len() > max {
        return Err(AppError::PayloadTooLarge {
            size: body.len(),
            max,
        });
    }

    let request_id = Uuid::new_v4();
    state
        .queue()
        .enqueue(request_id, state.config().queue.max_depth)?;
    state.store().create(request_id, body);

    tracing::info!(
        request_id = %request_id,
        queue_depth = state.queue().len(),
        "Image uploaded and queued"
    );

    Ok(Json(UploadResponse {
        request_id,
        message: "File uploaded successfully. Waiting for processing.",
    }))
}
