//! Crop rectangle arithmetic.

use super::detector::{BoundingBox, DetectedFace};
use crate::error::EditError;
use crate::imaging::{CropRect, ImageMetadata};

/// Pick the face at `index`. Any index is out of range when nothing was
/// detected.
pub fn select_face(faces: &[DetectedFace], index: usize) -> Result<BoundingBox, EditError> {
    faces
        .get(index)
        .map(|face| face.bounding_box)
        .ok_or(EditError::SmartCropFaceIndexOutOfRange {
            index,
            detected: faces.len(),
        })
}

/// Turn a normalized bounding box into a pixel rectangle, grown by
/// `padding` on every side. The result may fall outside the image.
pub fn crop_area(bbox: &BoundingBox, metadata: ImageMetadata, padding: f64) -> CropRect {
    let width = metadata.width as f64;
    let height = metadata.height as f64;

    CropRect::new(
        (bbox.left * width - padding).floor() as i64,
        (bbox.top * height - padding).floor() as i64,
        (bbox.width * width + 2.0 * padding).floor() as i64,
        (bbox.height * height + 2.0 * padding).floor() as i64,
    )
}
