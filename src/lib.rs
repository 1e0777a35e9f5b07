//! Filedrop - a small HTTP image drop.
//!
//! Accepts single JPEG/PNG uploads, stores them in a flat directory under a
//! generated identifier, and lets clients rename or delete them by that
//! identifier.

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{FiledropError, Result};
pub use file::{FileId, FileService, FileStorage, StoredName, UploadPolicy};
pub use web::WebServer;
