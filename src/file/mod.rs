//! File storage module for Filedrop.
//!
//! This module provides the on-disk side of the service:
//! - Identifier generation and stored-filename parsing
//! - A flat storage directory with identifier lookup
//! - Staged, size-limited uploads
//! - Per-identifier serialization of delete and rename

mod identifier;
mod locks;
mod service;
mod storage;
mod upload;

pub use identifier::{extension_of, FileId, StoredName};
pub use locks::{IdGuard, IdLocks};
pub use service::{validate_display_name, FileService, UploadPolicy};
pub use storage::FileStorage;
pub use upload::{PendingUpload, StoredFile};

/// MIME types accepted by default.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Default maximum upload size (1MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 1024 * 1024;

/// Maximum length for a display name (in characters).
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Maximum length for a derived extension, including the dot.
pub const MAX_EXTENSION_LENGTH: usize = 16;

/// Longest filename most filesystems accept (in bytes).
pub const MAX_FILENAME_BYTES: usize = 255;

/// Maximum encoded length of a display name, so that
/// `<id>_<name><extension>` always fits in [`MAX_FILENAME_BYTES`].
pub const MAX_DISPLAY_NAME_BYTES: usize = MAX_FILENAME_BYTES - 36 - 1 - MAX_EXTENSION_LENGTH;

/// Format a byte count for user-facing messages (e.g. "1MB", "512KB").
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}
