//! Error types for importing technology documents.

use thiserror::Error;

/// Why an import was rejected.
///
/// The display text of each variant is the message shown to the user and
/// mirrored into the store's error notification.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file type: '{0}' (expected a .json file)")]
    UnsupportedFileType(String),

    #[error("File is too large: {size} bytes (limit is {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Import failed validation:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

impl ImportError {
    /// Per-record validation messages, empty for every other kind of failure.
    pub fn validation_errors(&self) -> &[String] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}
