//! File handlers for the Web API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::file::{format_size, PendingUpload};
use crate::web::dto::{
    FileUploadResponse, MessageResponse, RenameFileRequest, RenameFileResponse, ValidatedJson,
};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::AppState;

/// Name of the multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// Map a multipart stream error, keeping body-limit failures distinct.
fn multipart_error(err: MultipartError, limit: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Upload rejected by body limit: {}", err);
        ApiError::payload_too_large(format!("File too large (max {})", format_size(limit)))
    } else {
        tracing::warn!("Failed to read multipart data: {}", err);
        ApiError::bad_request("Invalid multipart data")
    }
}

/// PUT /upload - Upload a single image.
///
/// Request body: multipart/form-data with a `file` part. Other parts are
/// ignored. The part is streamed to disk and only becomes visible under its
/// identifier once the whole body has been read.
#[utoipa::path(
    put,
    path = "/upload",
    tag = "files",
    request_body(content = String, content_type = "multipart/form-data", description = "Form with a single `file` part (image/jpeg or image/png)"),
    responses(
        (status = 200, description = "File uploaded", body = FileUploadResponse),
        (status = 400, description = "No file uploaded or malformed multipart", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 415, description = "File type not allowed", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FileUploadResponse>, ApiError> {
    let limit = state.files.policy().max_size();

    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Upload without multipart body: {}", e);
        ApiError::bad_request("No file uploaded")
    })?;

    let mut upload: Option<(PendingUpload, String)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // A `file` part without a filename is a text field, not an upload.
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if let Some((pending, _)) = upload.take() {
            pending.abort().await;
            return Err(ApiError::bad_request("Only one file may be uploaded"));
        }

        let content_type = field.content_type().map(str::to_string);
        let mut pending = state
            .files
            .begin_upload(&original_name, content_type.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(
                    original_name = %original_name,
                    content_type = ?content_type,
                    "Upload rejected: {}",
                    e
                );
                ApiError::from(e)
            })?;

        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    pending.abort().await;
                    return Err(multipart_error(e, limit));
                }
            };
            if let Err(e) = pending.write_chunk(&chunk).await {
                tracing::warn!(
                    original_name = %original_name,
                    limit,
                    written = pending.written(),
                    "Upload rejected: {}",
                    e
                );
                pending.abort().await;
                return Err(e.into());
            }
        }

        upload = Some((pending, original_name));
    }

    let (pending, original_name) = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let stored = pending.commit().await?;

    tracing::info!(
        id = %stored.id,
        filename = %stored.filename,
        size = stored.size,
        "File uploaded"
    );

    Ok(Json(FileUploadResponse::new(&stored, original_name)))
}

/// DELETE /delete-file/:id - Delete a file by identifier.
#[utoipa::path(
    delete,
    path = "/delete-file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File identifier")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let filename = state.files.delete(&id).await?;

    Ok(Json(MessageResponse::new(format!(
        "File {filename} deleted successfully."
    ))))
}

/// POST /rename-file - Attach a display name to a file.
#[utoipa::path(
    post,
    path = "/rename-file",
    tag = "files",
    request_body = RenameFileRequest,
    responses(
        (status = 200, description = "File renamed", body = RenameFileResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RenameFileRequest>,
) -> Result<Json<RenameFileResponse>, ApiError> {
    let new_filename = state.files.rename(&req.id, &req.new_name).await?;

    Ok(Json(RenameFileResponse {
        message: "File renamed successfully".to_string(),
        new_filename,
    }))
}
