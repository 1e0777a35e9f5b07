//! Staged, size-limited uploads.

use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::{FiledropError, Result};

use super::identifier::{FileId, StoredName};

/// A file that has been written to the storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Identifier of the file.
    pub id: FileId,
    /// Filename inside the storage directory.
    pub filename: String,
    /// Full path of the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

/// An upload in progress.
///
/// Chunks are appended to a hidden staging file next to the final location.
/// Nothing becomes visible under the identifier until [`commit`] succeeds,
/// and the staging file is removed if the upload is aborted or dropped.
///
/// [`commit`]: PendingUpload::commit
#[derive(Debug)]
pub struct PendingUpload {
    name: StoredName,
    filename: String,
    staging_path: PathBuf,
    final_path: PathBuf,
    file: Option<File>,
    written: u64,
    limit: u64,
    finished: bool,
}

impl PendingUpload {
    pub(super) async fn create(base_path: &Path, name: StoredName, limit: u64) -> Result<Self> {
        let filename = name.to_filename();
        let staging_path = base_path.join(format!(".{filename}.part"));
        let final_path = base_path.join(&filename);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging_path)
            .await?;

        Ok(Self {
            name,
            filename,
            staging_path,
            final_path,
            file: Some(file),
            written: 0,
            limit,
            finished: false,
        })
    }

    /// Identifier assigned to this upload.
    pub fn id(&self) -> FileId {
        self.name.id
    }

    /// Filename the upload will be stored under.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append a chunk.
    ///
    /// Fails with [`FiledropError::TooLarge`] if the chunk would push the
    /// upload past its limit; nothing from that chunk is written.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let len = chunk.len() as u64;
        if self.written.saturating_add(len) > self.limit {
            return Err(FiledropError::TooLarge { limit: self.limit });
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| FiledropError::Io(std::io::Error::other("upload already closed")))?;
        file.write_all(chunk).await?;
        self.written += len;

        Ok(())
    }

    /// Flush the staged bytes and move them to their final name.
    pub async fn commit(mut self) -> Result<StoredFile> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }

        fs::rename(&self.staging_path, &self.final_path).await?;
        self.finished = true;

        Ok(StoredFile {
            id: self.name.id,
            filename: self.filename.clone(),
            path: self.final_path.clone(),
            size: self.written,
        })
    }

    /// Discard the upload and its staged bytes.
    pub async fn abort(mut self) {
        self.file.take();
        if let Err(e) = fs::remove_file(&self.staging_path).await {
            tracing::warn!(path = %self.staging_path.display(), error = %e, "Failed to remove staged upload");
        }
        self.finished = true;
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if !self.finished {
            self.file.take();
            if let Err(e) = std::fs::remove_file(&self.staging_path) {
                tracing::warn!(path = %self.staging_path.display(), error = %e, "Failed to remove staged upload");
            }
        }
    }
}
