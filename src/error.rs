//! Edit engine error types
//!
//! Every failure a request can hit maps to one `EditError` variant with a
//! stable error code and an HTTP status, so the caller can surface it
//! without inspecting messages.

use thiserror::Error;

/// Failure reported by an external collaborator (object storage, face detection).
///
/// The status and code are carried through verbatim; a missing status is
/// reported as 500.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{message}", code_prefix(.code))]
pub struct CollaboratorError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(status: Option<u16>, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

fn code_prefix(code: &Option<String>) -> String {
    code.as_ref()
        .map(|code| format!("{}: ", code))
        .unwrap_or_default()
}

/// Errors raised while applying an edit directive set.
#[derive(Error, Debug, Clone)]
pub enum EditError {
    #[error("The padding value you provided exceeds the boundaries of the original image. Please try choosing a smaller value or a different face index.")]
    SmartCropPaddingOutOfBounds,

    #[error("The face index you provided ({index}) exceeds the number of faces detected in the image ({detected}).")]
    SmartCropFaceIndexOutOfRange { index: usize, detected: usize },

    #[error("{0}")]
    Collaborator(CollaboratorError),

    #[error("Unsupported edit '{name}'")]
    UnsupportedEdit { name: String },

    #[error("Invalid parameter for '{edit}': {message}")]
    InvalidParameter { edit: String, message: String },

    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: String },

    #[error("Image dimensions {width}x{height} exceed limit of {max_pixels} pixels")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("{operation} failed: {message}")]
    Processing { operation: String, message: String },

    #[error("Failed to encode to {format}: {message}")]
    EncodeFailed { format: String, message: String },

    #[error("Failed to render watermark: {0}")]
    Watermark(String),
}

impl EditError {
    /// Stable, machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            EditError::SmartCropPaddingOutOfBounds => "SmartCrop::PaddingOutOfBounds",
            EditError::SmartCropFaceIndexOutOfRange { .. } => "SmartCrop::FaceIndexOutOfRange",
            EditError::Collaborator(err) => err.code.as_deref().unwrap_or("CollaboratorError"),
            EditError::UnsupportedEdit { .. } => "ImageEdits::UnsupportedEdit",
            EditError::InvalidParameter { .. } => "ImageEdits::InvalidParameter",
            EditError::DecodeFailed { .. } => "ImageEdits::DecodeFailed",
            EditError::ImageTooLarge { .. } => "ImageEdits::ImageTooLarge",
            EditError::Processing { .. } => "ImageEdits::ProcessingFailed",
            EditError::EncodeFailed { .. } => "ImageEdits::EncodeFailed",
            EditError::Watermark(_) => "Watermark::RenderFailed",
        }
    }

    /// Maps the error to the HTTP status the caller should answer with.
    ///
    /// - Smart crop, parameter, decode and size errors → 400
    /// - Collaborator errors → the collaborator's status, 500 when unknown
    /// - Processing, encode and watermark failures → 500
    pub fn status(&self) -> u16 {
        match self {
            EditError::SmartCropPaddingOutOfBounds
            | EditError::SmartCropFaceIndexOutOfRange { .. }
            | EditError::UnsupportedEdit { .. }
            | EditError::InvalidParameter { .. }
            | EditError::DecodeFailed { .. }
            | EditError::ImageTooLarge { .. } => 400,

            EditError::Collaborator(err) => err.status.unwrap_or(500),

            EditError::Processing { .. }
            | EditError::EncodeFailed { .. }
            | EditError::Watermark(_) => 500,
        }
    }

    pub fn invalid_param(edit: impl Into<String>, message: impl Into<String>) -> Self {
        EditError::InvalidParameter {
            edit: edit.into(),
            message: message.into(),
        }
    }

    pub fn processing(operation: impl Into<String>, message: impl Into<String>) -> Self {
        EditError::Processing {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        EditError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        EditError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }
}

impl From<CollaboratorError> for EditError {
    fn from(err: CollaboratorError) -> Self {
        EditError::Collaborator(err)
    }
}
