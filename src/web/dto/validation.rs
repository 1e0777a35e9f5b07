//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::file::validate_display_name;
use crate::web::error::ApiError;
use crate::FiledropError;

/// Message used when a required rename field is absent or blank.
pub const RENAME_FIELDS_REQUIRED: &str = "ID and newName required";

/// A JSON extractor that validates the request body.
///
/// This extractor deserializes the request body as JSON and then validates it
/// using the `validator` crate. Both malformed JSON and failed validation are
/// reported as 400 responses.
///
/// # Example
///
/// ```ignore
/// use filedrop::web::dto::ValidatedJson;
///
/// async fn rename_file(
///     ValidatedJson(payload): ValidatedJson<RenameFileRequest>,
/// ) -> Result<Json<RenameFileResponse>, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Rejected JSON body: {}", e.body_text());
            ApiError::bad_request(format!("Invalid JSON: {}", e.body_text()))
        })?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a required string field is present and not blank.
pub fn required_field(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(RENAME_FIELDS_REQUIRED.into()));
    }
    Ok(())
}

/// Validate a display name for use inside a stored filename.
pub fn valid_display_name(value: &str) -> Result<(), ValidationError> {
    required_field(value)?;

    validate_display_name(value).map_err(|e| {
        let message = match e {
            FiledropError::Validation(msg) => msg,
            other => other.to_string(),
        };
        ValidationError::new("display_name").with_message(message.into())
    })
}
