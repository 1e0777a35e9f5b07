//! File identifiers and stored filenames.
//!
//! Every stored file is named `<id>[_<display name>]<extension>`, where `id`
//! is a hyphenated lowercase UUID v4. The identifier always has the same
//! length, so the character following it decides whether a filename belongs
//! to it.

use std::fmt;

use uuid::Uuid;

use super::MAX_EXTENSION_LENGTH;

/// Length of a hyphenated UUID.
const ID_LEN: usize = 36;

/// Opaque identifier of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(Uuid);

impl FileId {
    /// Generate a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier in its canonical (hyphenated, lowercase) form.
    ///
    /// Returns `None` for anything else, including uppercase or braced UUIDs,
    /// since those can never prefix a stored filename.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != ID_LEN {
            return None;
        }
        let uuid = Uuid::try_parse(s).ok()?;
        let id = Self(uuid);
        (id.to_string() == s).then_some(id)
    }

    /// Check whether `filename` belongs to this identifier.
    ///
    /// Matches the bare identifier, or the identifier followed by `.` or `_`.
    pub fn matches(&self, filename: &str) -> bool {
        let id = self.to_string();
        match filename.strip_prefix(id.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('_'),
            None => false,
        }
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Extract the extension (with its leading dot) from a client-supplied filename.
///
/// Only the last path component is considered, dotfiles have no extension,
/// and suffixes that are not short ASCII alphanumerics are dropped so the
/// result is always safe to embed in a stored filename.
pub fn extension_of(filename: &str) -> &str {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => {
            let ext = &base[idx..];
            let valid = ext.len() > 1
                && ext.len() <= MAX_EXTENSION_LENGTH
                && ext[1..].chars().all(|c| c.is_ascii_alphanumeric());
            if valid {
                ext
            } else {
                ""
            }
        }
    }
}

/// A parsed stored filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredName {
    /// Identifier prefix.
    pub id: FileId,
    /// Display name attached by a rename.
    pub display_name: Option<String>,
    /// Extension including the leading dot, or empty.
    pub extension: String,
}

impl StoredName {
    /// Create a name for a freshly uploaded file.
    pub fn new(id: FileId, extension: impl Into<String>) -> Self {
        Self {
            id,
            display_name: None,
            extension: extension.into(),
        }
    }

    /// Attach a display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Parse a filename from the storage directory.
    ///
    /// The extension is the suffix from the last dot after the identifier.
    pub fn parse(filename: &str) -> Option<Self> {
        let id = FileId::parse(filename.get(..ID_LEN)?)?;
        let rest = &filename[ID_LEN..];

        if rest.is_empty() {
            return Some(Self::new(id, ""));
        }

        let (display, extension) = match rest.rfind('.') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        match display.strip_prefix('_') {
            Some(name) => Some(Self::new(id, extension).with_display_name(name)),
            None if display.is_empty() => Some(Self::new(id, extension)),
            None => None,
        }
    }

    /// Render the on-disk filename.
    pub fn to_filename(&self) -> String {
        match &self.display_name {
            Some(name) => format!("{}_{}{}", self.id, name, self.extension),
            None => format!("{}{}", self.id, self.extension),
        }
    }
}

impl fmt::Display for StoredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_filename())
    }
}
