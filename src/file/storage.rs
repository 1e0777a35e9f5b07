//! File storage for Filedrop.
//!
//! This module provides the physical storage directory:
//! - A single flat directory, created on startup
//! - Identifier lookup by directory scan
//! - Remove, rename and read of stored files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{FiledropError, Result};

use super::identifier::{extension_of, FileId, StoredName};
use super::upload::PendingUpload;

/// File storage rooted at a single flat directory.
///
/// ```text
/// {base_path}/
/// ├── 0f8fad5b-d9cb-469f-a165-70867728950e.png
/// ├── 7c9e6679-7425-40de-944b-e07fc1f90ae7_holiday.jpg
/// └── .1b4e28ba-2fa1-11d2-883f-0016d3cca427.png.part   (upload in progress)
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Absolute path of the storage directory.
    base_path: PathBuf,
}

impl FileStorage {
    /// Open the storage directory, creating it if it doesn't exist.
    ///
    /// The path is canonicalized so reported file paths are absolute.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        let base_path = fs::canonicalize(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the full path for a stored filename.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.base_path.join(filename)
    }

    /// Find the stored filename belonging to `id`.
    ///
    /// Scans the directory and returns the first regular file whose name
    /// matches the identifier. Entries with non UTF-8 names are skipped.
    pub fn find_by_id(&self, id: &FileId) -> Result<Option<String>> {
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if id.matches(&name) {
                return Ok(Some(name));
            }
        }

        Ok(None)
    }

    /// Remove a stored file.
    pub fn remove(&self, filename: &str) -> Result<()> {
        match fs::remove_file(self.path_for(filename)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FiledropError::NotFound(format!("File {filename}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rename a stored file within the storage directory.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return Ok(());
        }

        match fs::rename(self.path_for(from), self.path_for(to)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FiledropError::NotFound(format!("File {from}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read the content of a stored file.
    #[cfg(test)]
    pub(crate) fn load(&self, filename: &str) -> Result<Vec<u8>> {
        match fs::read(self.path_for(filename)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FiledropError::NotFound(format!("File {filename}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Start a new upload under a freshly generated identifier.
    ///
    /// The extension is taken from `original_name`. Bytes are staged in a
    /// hidden file until [`PendingUpload::commit`] moves them into place.
    pub async fn begin_upload(&self, original_name: &str, limit: u64) -> Result<PendingUpload> {
        let name = StoredName::new(FileId::generate(), extension_of(original_name));
        PendingUpload::create(&self.base_path, name, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        (temp_dir, storage)
    }

    fn put(storage: &FileStorage, filename: &str, content: &[u8]) {
        fs::write(storage.path_for(filename), content).unwrap();
    }

    #[test]
    fn test_new_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage_path = temp_dir.path().join("nested").join("uploads");

        assert!(!storage_path.exists());

        let storage = FileStorage::new(&storage_path).unwrap();

        assert!(storage_path.is_dir());
        assert_eq!(storage.base_path(), fs::canonicalize(&storage_path).unwrap());
        assert!(storage.base_path().is_absolute());
    }

    #[test]
    fn test_new_existing_directory() {
        let (temp_dir, storage) = setup_storage();
        put(&storage, "keep.txt", b"x");

        let reopened = FileStorage::new(temp_dir.path()).unwrap();
        assert_eq!(reopened.load("keep.txt").unwrap(), b"x");
    }

    #[test]
    fn test_find_by_id() {
        let (_temp_dir, storage) = setup_storage();
        let id = FileId::generate();
        let other = FileId::generate();

        put(&storage, &format!("{other}.png"), b"other");
        put(&storage, &format!("{id}.jpg"), b"mine");

        assert_eq!(storage.find_by_id(&id).unwrap(), Some(format!("{id}.jpg")));
    }

    #[test]
    fn test_find_by_id_renamed() {
        let (_temp_dir, storage) = setup_storage();
        let id = FileId::generate();
        put(&storage, &format!("{id}_beach.png"), b"data");

        assert_eq!(
            storage.find_by_id(&id).unwrap(),
            Some(format!("{id}_beach.png"))
        );
    }

    #[test]
    fn test_find_by_id_not_found() {
        let (_temp_dir, storage) = setup_storage();
        put(&storage, &format!("{}.png", FileId::generate()), b"data");

        assert_eq!(storage.find_by_id(&FileId::generate()).unwrap(), None);
    }

    #[test]
    fn test_find_by_id_ignores_staging_and_dirs() {
        let (_temp_dir, storage) = setup_storage();
        let id = FileId::generate();

        put(&storage, &format!(".{id}.png.part"), b"partial");
        fs::create_dir(storage.path_for(&format!("{id}_dir"))).unwrap();

        assert_eq!(storage.find_by_id(&id).unwrap(), None);
    }

    #[test]
    fn test_remove() {
        let (_temp_dir, storage) = setup_storage();
        put(&storage, "a.png", b"data");

        storage.remove("a.png").unwrap();
        assert!(!storage.path_for("a.png").exists());
    }

    #[test]
    fn test_remove_not_found() {
        let (_temp_dir, storage) = setup_storage();

        let result = storage.remove("missing.png");
        assert!(matches!(result, Err(FiledropError::NotFound(_))));
    }

    #[test]
    fn test_rename_preserves_content() {
        let (_temp_dir, storage) = setup_storage();
        let content: Vec<u8> = (0..=255).collect();
        put(&storage, "old.png", &content);

        storage.rename("old.png", "new.png").unwrap();

        assert!(!storage.path_for("old.png").exists());
        assert_eq!(storage.load("new.png").unwrap(), content);
    }

    #[test]
    fn test_rename_same_name() {
        let (_temp_dir, storage) = setup_storage();
        put(&storage, "same.png", b"data");

        storage.rename("same.png", "same.png").unwrap();
        assert_eq!(storage.load("same.png").unwrap(), b"data");
    }

    #[test]
    fn test_rename_missing_source() {
        let (_temp_dir, storage) = setup_storage();

        let result = storage.rename("missing.png", "other.png");
        assert!(matches!(result, Err(FiledropError::NotFound(_))));
    }

    #[test]
    fn test_load_not_found() {
        let (_temp_dir, storage) = setup_storage();

        let result = storage.load("nonexistent.png");
        assert!(matches!(result, Err(FiledropError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_begin_upload_uses_original_extension() {
        let (_temp_dir, storage) = setup_storage();

        let pending = storage.begin_upload("cat.jpeg", 1024).await.unwrap();
        assert!(pending.filename().ends_with(".jpeg"));
        assert!(pending.filename().starts_with(&pending.id().to_string()));

        let pending = storage.begin_upload("no_extension", 1024).await.unwrap();
        assert_eq!(pending.filename(), pending.id().to_string());
    }
}
