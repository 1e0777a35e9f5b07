//! File service for Filedrop.
//!
//! This module provides the high-level operations behind the HTTP API:
//! - Upload with MIME type and size checks
//! - Delete and rename by identifier, serialized per identifier

use crate::{FiledropError, Result};

use super::identifier::{extension_of, FileId, StoredName};
use super::locks::IdLocks;
use super::storage::FileStorage;
use super::upload::PendingUpload;
use super::{
    ALLOWED_MIME_TYPES, DEFAULT_MAX_UPLOAD_SIZE, MAX_DISPLAY_NAME_BYTES, MAX_DISPLAY_NAME_LENGTH,
};

/// Which uploads are accepted.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_size: u64,
    allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_UPLOAD_SIZE,
            allowed_types: ALLOWED_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl UploadPolicy {
    /// Create a policy with a size limit and accepted MIME types.
    pub fn new(max_size: u64, allowed_types: Vec<String>) -> Self {
        Self {
            max_size,
            allowed_types,
        }
    }

    /// Maximum upload size in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Accepted MIME types.
    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    /// Check a part's content type. Parameters such as `; charset=` are ignored.
    pub fn check_type(&self, content_type: Option<&str>) -> Result<()> {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if self.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&essence)) {
            Ok(())
        } else {
            Err(FiledropError::UnsupportedType(self.rejection_message()))
        }
    }

    /// Message shown when a type is rejected, e.g. "Only JPEG/PNG files are allowed."
    pub fn rejection_message(&self) -> String {
        let names: Vec<String> = self
            .allowed_types
            .iter()
            .map(|t| t.rsplit('/').next().unwrap_or(t).to_uppercase())
            .collect();
        format!("Only {} files are allowed.", names.join("/"))
    }
}

/// Validate a display name supplied for a rename.
///
/// Display names become part of a filename, so they must be non-blank, at
/// most [`MAX_DISPLAY_NAME_LENGTH`] characters and [`MAX_DISPLAY_NAME_BYTES`]
/// bytes, free of path separators and control characters, and not `.` or `..`.
pub fn validate_display_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(FiledropError::Validation("newName must not be empty".to_string()));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(FiledropError::Validation(format!(
            "newName must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    if name.len() > MAX_DISPLAY_NAME_BYTES {
        return Err(FiledropError::Validation(format!(
            "newName must be at most {MAX_DISPLAY_NAME_BYTES} bytes"
        )));
    }
    if name.contains(|c| c == '/' || c == '\\') {
        return Err(FiledropError::Validation(
            "newName must not contain path separators".to_string(),
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(FiledropError::Validation(
            "newName must not contain control characters".to_string(),
        ));
    }
    if name == "." || name == ".." {
        return Err(FiledropError::Validation("newName is not a valid name".to_string()));
    }
    Ok(())
}

/// File service combining storage, upload policy and identifier locks.
#[derive(Debug)]
pub struct FileService {
    storage: FileStorage,
    policy: UploadPolicy,
    locks: IdLocks,
}

impl FileService {
    /// Create a new FileService with the default upload policy.
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage,
            policy: UploadPolicy::default(),
            locks: IdLocks::new(),
        }
    }

    /// Replace the upload policy.
    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The underlying storage.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// The upload policy.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Start an upload after checking its content type.
    ///
    /// No file is created when the type is rejected.
    pub async fn begin_upload(
        &self,
        original_name: &str,
        content_type: Option<&str>,
    ) -> Result<PendingUpload> {
        self.policy.check_type(content_type)?;
        self.storage
            .begin_upload(original_name, self.policy.max_size)
            .await
    }

    /// Resolve an identifier to its stored filename.
    ///
    /// Malformed identifiers resolve to nothing.
    #[cfg(test)]
    pub(crate) fn find(&self, raw_id: &str) -> Result<Option<String>> {
        match FileId::parse(raw_id) {
            Some(id) => self.storage.find_by_id(&id),
            None => Ok(None),
        }
    }

    /// Delete the file stored under `raw_id`.
    ///
    /// Returns the filename that was removed.
    pub async fn delete(&self, raw_id: &str) -> Result<String> {
        let id = parse_id(raw_id)?;
        let _guard = self.locks.lock(id).await;

        let filename = self.resolve(&id)?;
        self.storage.remove(&filename)?;

        tracing::info!(id = %id, filename = %filename, "File deleted");
        Ok(filename)
    }

    /// Rename the file stored under `raw_id` to `<id>_<new_name><ext>`.
    ///
    /// The extension is kept from the current filename. Returns the new
    /// filename.
    pub async fn rename(&self, raw_id: &str, new_name: &str) -> Result<String> {
        validate_display_name(new_name)?;
        let id = parse_id(raw_id)?;
        let _guard = self.locks.lock(id).await;

        let current = self.resolve(&id)?;
        let extension = match StoredName::parse(&current) {
            Some(parsed) => parsed.extension,
            None => extension_of(&current).to_string(),
        };
        let renamed = StoredName::new(id, extension.clone())
            .with_display_name(new_name)
            .to_filename();

        // A dotted name on a file without extension would read back as one.
        let kept = StoredName::parse(&renamed).map(|parsed| parsed.extension);
        if kept.as_deref() != Some(extension.as_str()) {
            return Err(FiledropError::Validation(
                "newName must not add a file extension".to_string(),
            ));
        }

        self.storage.rename(&current, &renamed)?;

        tracing::info!(id = %id, from = %current, to = %renamed, "File renamed");
        Ok(renamed)
    }

    fn resolve(&self, id: &FileId) -> Result<String> {
        self.storage
            .find_by_id(id)?
            .ok_or_else(|| FiledropError::NotFound("File".to_string()))
    }
}

fn parse_id(raw_id: &str) -> Result<FileId> {
    FileId::parse(raw_id).ok_or_else(|| FiledropError::NotFound("File".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{MAX_EXTENSION_LENGTH, MAX_FILENAME_BYTES};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup_service() -> (TempDir, FileService) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        (temp_dir, FileService::new(storage))
    }

    fn count_files(service: &FileService) -> usize {
        fs::read_dir(service.storage().base_path()).unwrap().count()
    }

    async fn upload(service: &FileService, name: &str, content: &[u8]) -> String {
        let mut pending = service.begin_upload(name, Some("image/png")).await.unwrap();
        pending.write_chunk(content).await.unwrap();
        pending.commit().await.unwrap().id.to_string()
    }

    #[test]
    fn test_policy_check_type() {
        let policy = UploadPolicy::default();

        assert!(policy.check_type(Some("image/jpeg")).is_ok());
        assert!(policy.check_type(Some("image/png")).is_ok());
        assert!(policy.check_type(Some("IMAGE/PNG")).is_ok());
        assert!(policy.check_type(Some("image/png; charset=binary")).is_ok());

        assert!(matches!(
            policy.check_type(Some("text/plain")),
            Err(FiledropError::UnsupportedType(_))
        ));
        assert!(policy.check_type(Some("image/gif")).is_err());
        assert!(policy.check_type(None).is_err());
    }

    #[test]
    fn test_policy_rejection_message() {
        assert_eq!(
            UploadPolicy::default().rejection_message(),
            "Only JPEG/PNG files are allowed."
        );

        let policy = UploadPolicy::new(10, vec!["image/webp".to_string()]);
        assert_eq!(policy.rejection_message(), "Only WEBP files are allowed.");
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("holiday").is_ok());
        assert!(validate_display_name("summer 2024 v1.2").is_ok());
        assert!(validate_display_name("日本語").is_ok());

        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name("a/b").is_err());
        assert!(validate_display_name("..\\evil").is_err());
        assert!(validate_display_name("line\nbreak").is_err());
        assert!(validate_display_name("..").is_err());
        assert!(validate_display_name(&"x".repeat(MAX_DISPLAY_NAME_LENGTH)).is_ok());
        assert!(validate_display_name(&"x".repeat(MAX_DISPLAY_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_display_name_byte_length() {
        // 100 characters, 300 bytes.
        let wide = "日".repeat(MAX_DISPLAY_NAME_LENGTH);
        assert!(matches!(
            validate_display_name(&wide),
            Err(FiledropError::Validation(_))
        ));

        let fits = "日".repeat(MAX_DISPLAY_NAME_BYTES / 3);
        assert!(validate_display_name(&fits).is_ok());
        assert!(36 + 1 + fits.len() + MAX_EXTENSION_LENGTH <= MAX_FILENAME_BYTES);
    }

    #[tokio::test]
    async fn test_begin_upload_rejects_type_without_file() {
        let (_temp_dir, service) = setup_service();

        let result = service.begin_upload("notes.txt", Some("text/plain")).await;

        assert!(matches!(result, Err(FiledropError::UnsupportedType(_))));
        assert_eq!(count_files(&service), 0);
    }

    #[tokio::test]
    async fn test_policy_limit_applies() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        let service = FileService::new(storage).with_policy(UploadPolicy::new(
            8,
            vec!["image/png".to_string()],
        ));

        let mut pending = service.begin_upload("a.png", Some("image/png")).await.unwrap();
        let result = pending.write_chunk(b"123456789").await;

        assert!(matches!(result, Err(FiledropError::TooLarge { limit: 8 })));
        drop(pending);
        assert_eq!(count_files(&service), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_temp_dir, service) = setup_service();
        let id = upload(&service, "a.png", b"data").await;
        let keep = upload(&service, "b.png", b"data").await;

        let filename = service.delete(&id).await.unwrap();

        assert_eq!(filename, format!("{id}.png"));
        assert_eq!(service.find(&id).unwrap(), None);
        assert_eq!(service.find(&keep).unwrap(), Some(format!("{keep}.png")));
        assert_eq!(count_files(&service), 1);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (_temp_dir, service) = setup_service();
        let id = upload(&service, "a.png", b"data").await;

        service.delete(&id).await.unwrap();
        let result = service.delete(&id).await;

        assert!(matches!(result, Err(FiledropError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_malformed_id() {
        let (_temp_dir, service) = setup_service();
        upload(&service, "a.png", b"data").await;

        // A short prefix must never resolve to someone else's file.
        assert!(matches!(
            service.delete("0").await,
            Err(FiledropError::NotFound(_))
        ));
        assert!(matches!(
            service.delete("").await,
            Err(FiledropError::NotFound(_))
        ));
        assert_eq!(count_files(&service), 1);
    }

    #[tokio::test]
    async fn test_rename_keeps_extension_and_content() {
        let (_temp_dir, service) = setup_service();
        let id = upload(&service, "photo.jpg", b"jpeg bytes").await;

        let renamed = service.rename(&id, "beach").await.unwrap();

        assert_eq!(renamed, format!("{id}_beach.jpg"));
        assert_eq!(service.storage().load(&renamed).unwrap(), b"jpeg bytes");
        assert_eq!(count_files(&service), 1);
    }

    #[tokio::test]
    async fn test_rename_twice_replaces_display_name() {
        let (_temp_dir, service) = setup_service();
        let id = upload(&service, "photo.png", b"data").await;

        service.rename(&id, "first.draft").await.unwrap();
        let renamed = service.rename(&id, "second").await.unwrap();

        assert_eq!(renamed, format!("{id}_second.png"));
        assert_eq!(service.find(&id).unwrap(), Some(renamed));
    }

    #[tokio::test]
    async fn test_rename_longest_name_fits() {
        let (_temp_dir, service) = setup_service();
        let id = upload(&service, "photo.png", b"data").await;
        let name = "日".repeat(MAX_DISPLAY_NAME_BYTES / 3);

        let renamed = service.rename(&id, &name).await.unwrap();

        assert_eq!(renamed, format!("{id}_{name}.png"));
        assert_eq!(service.storage().load(&renamed).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_rename_without_extension_rejects_dotted_name() {
        let (_temp_dir, service) = setup_service();
        let id = upload(&service, "noext", b"data").await;

        let result = service.rename(&id, "a.b").await;
        assert!(matches!(result, Err(FiledropError::Validation(_))));
        assert_eq!(service.find(&id).unwrap(), Some(id.clone()));

        let renamed = service.rename(&id, "plain").await.unwrap();
        assert_eq!(renamed, format!("{id}_plain"));
        let renamed = service.rename(&id, "again").await.unwrap();
        assert_eq!(renamed, format!("{id}_again"));
    }

    #[tokio::test]
    async fn test_rename_not_found() {
        let (_temp_dir, service) = setup_service();

        let result = service.rename(&FileId::generate().to_string(), "x").await;
        assert!(matches!(result, Err(FiledropError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rename_invalid_name_leaves_file() {
        let (_temp_dir, service) = setup_service();
        let id = upload(&service, "photo.png", b"data").await;

        let result = service.rename(&id, "../escape").await;

        assert!(matches!(result, Err(FiledropError::Validation(_))));
        assert_eq!(service.find(&id).unwrap(), Some(format!("{id}.png")));
    }

    #[tokio::test]
    async fn test_concurrent_delete_and_rename() {
        let (_temp_dir, service) = setup_service();
        let service = Arc::new(service);
        let id = upload(&service, "photo.png", b"data").await;

        let deleter = {
            let service = service.clone();
            let id = id.clone();
            tokio::spawn(async move { service.delete(&id).await })
        };
        let renamer = {
            let service = service.clone();
            let id = id.clone();
            tokio::spawn(async move { service.rename(&id, "late").await })
        };

        let deleted = deleter.await.unwrap();
        let renamed = renamer.await.unwrap();

        // Whichever runs first, the delete succeeds and the rename either
        // happened before it or saw nothing to rename.
        assert!(deleted.is_ok());
        assert!(matches!(renamed, Ok(_) | Err(FiledropError::NotFound(_))));
        assert_eq!(count_files(&service), 0);
    }
}
