//! Face-aware cropping
//!
//! Detects faces in the working image, picks one by confidence rank and
//! extracts it with optional padding.

pub mod crop;
pub mod detector;

pub use crop::{crop_area, select_face};
pub use detector::{BoundingBox, DetectedFace, FaceDetector, RekognitionFaceDetector};

use tracing::debug;

use crate::edits::SmartCropOptions;
use crate::error::EditError;
use crate::imaging::{ImageHandle, OutputFormat};

/// Quality of the JPEG sent for detection.
const DETECTION_QUALITY: u8 = 90;

/// Crop `handle` around the selected face.
///
/// A rectangle that does not fit inside the image after padding fails with
/// `SmartCrop::PaddingOutOfBounds`.
pub async fn apply_smart_crop(
    handle: &mut ImageHandle,
    detector: &dyn FaceDetector,
    options: &SmartCropOptions,
) -> Result<(), EditError> {
    let encoded = handle.encode(OutputFormat::Jpeg, DETECTION_QUALITY)?;
    let faces = detector.detect(&encoded.data).await?;

    let bbox = select_face(&faces, options.face_index())?;
    let rect = crop_area(&bbox, handle.metadata(), options.padding());

    debug!(
        faces = faces.len(),
        face_index = options.face_index(),
        left = rect.left,
        top = rect.top,
        width = rect.width,
        height = rect.height,
        "Smart crop area"
    );

    handle
        .extract(rect)
        .map_err(|_| EditError::SmartCropPaddingOutOfBounds)
}
