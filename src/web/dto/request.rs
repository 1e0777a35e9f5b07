//! Request DTOs for the Web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::validation::{required_field, valid_display_name};

/// Rename request.
///
/// Missing fields deserialize as empty strings so they are reported by
/// validation rather than as malformed JSON.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameFileRequest {
    /// Identifier of the file to rename.
    #[serde(default)]
    #[validate(custom(function = "required_field"))]
    pub id: String,
    /// New display name, embedded as `<id>_<newName><ext>`.
    #[serde(default, rename = "newName")]
    #[validate(custom(function = "valid_display_name"))]
    pub new_name: String,
}
