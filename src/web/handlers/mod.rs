//! API handlers for the Web API.

pub mod file;
pub mod system;

pub use file::*;
pub use system::*;

use crate::file::FileService;

/// Shared state of the Web API.
#[derive(Debug)]
pub struct AppState {
    /// File operations backed by the storage directory.
    pub files: FileService,
}

impl AppState {
    /// Create a new application state.
    pub fn new(files: FileService) -> Self {
        Self { files }
    }
}
