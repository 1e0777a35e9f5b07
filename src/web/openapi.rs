//! OpenAPI description of the Web API.

use utoipa::OpenApi;

use super::dto::{FileUploadResponse, MessageResponse, RenameFileRequest, RenameFileResponse};
use super::error::{ErrorBody, ErrorCode};
use super::handlers;

/// OpenAPI document for Filedrop.
#[derive(OpenApi)]
#[openapi(
    info(title = "Filedrop API", description = "Upload, rename and delete images on local disk"),
    paths(
        handlers::root,
        handlers::health_check,
        handlers::upload_file,
        handlers::delete_file,
        handlers::rename_file,
    ),
    components(schemas(
        FileUploadResponse,
        MessageResponse,
        RenameFileRequest,
        RenameFileResponse,
        ErrorBody,
        ErrorCode,
    )),
    tags(
        (name = "files", description = "Stored file operations"),
        (name = "system", description = "Liveness")
    )
)]
pub struct ApiDoc;
