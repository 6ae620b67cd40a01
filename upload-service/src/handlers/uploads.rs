use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ServiceError};
use crate::handlers::form::{parse_upload_form, UploadForm};
use crate::models::UploadRecord;
use crate::AppState;

pub const UPLOAD_SUCCESSFUL: &str = "Upload successful";
pub const UPLOAD_FAILED: &str = "Error uploading data";
pub const FETCH_FAILED: &str = "Error fetching data";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub data: UploadRecord,
}

/// Handle a multipart upload: host each attached image, then store the record
pub async fn create_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    tracing::info!("Received upload submission");

    let multipart = multipart.map_err(|e| {
        ApiError::new(UPLOAD_FAILED, ServiceError::InvalidForm(e.body_text()))
    })?;

    let record = submit(&state, multipart)
        .await
        .map_err(|e| ApiError::new(UPLOAD_FAILED, e))?;

    Ok(Json(UploadResponse {
        message: UPLOAD_SUCCESSFUL.to_string(),
        data: record,
    }))
}

async fn submit(state: &AppState, multipart: Multipart) -> Result<UploadRecord, ServiceError> {
    let UploadForm { mut upload, files } = parse_upload_form(multipart).await?;

    tracing::info!("Uploading {} file(s) to media storage", files.len());

    // One at a time, in the order the parts arrived
    for (field, data) in files {
        let url = state.uploader.upload(data, field).await?;
        upload.set_image(field, url);
    }

    let record = state.store.insert(upload).await?;

    tracing::info!("Upload stored: id={}", record.id);
    Ok(record)
}

/// Return every stored upload
pub async fn list_uploads(
    State(state): State<AppState>,
) -> Result<Json<Vec<UploadRecord>>, ApiError> {
    let records = state
        .store
        .list_all()
        .await
        .map_err(|e| ApiError::new(FETCH_FAILED, e))?;

    tracing::debug!("Listing {} upload(s)", records.len());
    Ok(Json(records))
}
