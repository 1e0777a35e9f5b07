//! Web API module for Filedrop.
//!
//! This module exposes the storage directory over HTTP: upload, delete and
//! rename of stored images, plus liveness endpoints and an OpenAPI document.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
