//! Error types for upload preprocessing.

use thiserror::Error;

/// Why an upload was rejected before any processing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// MIME type is not an image type
    #[error("Please choose an image file")]
    InvalidType,

    /// File exceeds the upload size limit
    #[error("Image is too large, the limit is 10 MB")]
    TooLarge,

    /// Decoded image is below the minimum resolution
    #[error("Image is too small, it must be at least 400x400 pixels")]
    TooSmall,
}

/// Errors that can occur while validating or resizing an upload.
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// Upload rejected by validation
    #[error("Invalid upload: {0}")]
    Validation(#[from] ValidationErrorKind),

    /// Image bytes could not be decoded (or even probed)
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Re-encoding the resized image failed
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// Output would exceed the hard byte ceiling even after resizing
    #[error("Image is still {size} bytes after resizing (limit {limit})")]
    StillTooLarge {
        /// Encoded size in bytes
        size: u64,
        /// Ceiling in bytes
        limit: u64,
    },

    /// Background task ended without producing a result
    #[error("Preprocessing task ended without a result")]
    TaskLost,
}

impl PreprocessError {
    /// The validation kind, for errors the user should see as a form message.
    pub fn validation_kind(&self) -> Option<ValidationErrorKind> {
        match self {
            PreprocessError::Validation(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Terminal errors need a different file from the user; retrying is pointless.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PreprocessError::Validation(_) | PreprocessError::StillTooLarge { .. }
        )
    }
}
