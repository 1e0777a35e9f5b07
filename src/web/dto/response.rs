//! Response DTOs for the Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::StoredFile;

/// Metadata returned after a successful upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResponse {
    /// Identifier of the stored file.
    pub id: String,
    /// Filename as sent by the client. Not retained after this response.
    pub original_name: String,
    /// Filename inside the storage directory.
    pub filename: String,
    /// Absolute path of the stored file.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
}

impl FileUploadResponse {
    /// Build the response for a stored file.
    pub fn new(stored: &StoredFile, original_name: impl Into<String>) -> Self {
        Self {
            id: stored.id.to_string(),
            original_name: original_name.into(),
            filename: stored.filename.clone(),
            path: stored.path.display().to_string(),
            size: stored.size,
        }
    }
}

/// Plain message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Rename response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileResponse {
    /// Human-readable message.
    pub message: String,
    /// Filename after the rename.
    pub new_filename: String,
}
