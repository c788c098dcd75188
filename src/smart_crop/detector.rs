//! Face detection collaborator.

use async_trait::async_trait;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::Image;
use aws_sdk_rekognition::Client as RekognitionClient;
use tracing::{debug, warn};

use crate::aws::collaborator_error;
use crate::error::CollaboratorError;

/// Face location as fractions (0.0 to 1.0) of the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedFace {
    pub bounding_box: BoundingBox,
    /// Detection confidence, 0 to 100
    pub confidence: f32,
}

/// Detects faces in encoded image bytes.
///
/// Implementations return faces ordered by descending confidence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, CollaboratorError>;
}

/// [`FaceDetector`] backed by Amazon Rekognition `DetectFaces`.
#[derive(Debug, Clone)]
pub struct RekognitionFaceDetector {
    client: RekognitionClient,
}

impl RekognitionFaceDetector {
    pub fn new(client: RekognitionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FaceDetector for RekognitionFaceDetector {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, CollaboratorError> {
        let response = self
            .client
            .detect_faces()
            .image(Image::builder().bytes(Blob::new(image.to_vec())).build())
            .send()
            .await
            .map_err(|e| {
                let err = collaborator_error(e);
                warn!(error = %err, "Face detection failed");
                err
            })?;

        let mut faces: Vec<DetectedFace> = response
            .face_details()
            .iter()
            .filter_map(|detail| {
                let bbox = detail.bounding_box()?;
                Some(DetectedFace {
                    bounding_box: BoundingBox::new(
                        bbox.left().unwrap_or(0.0) as f64,
                        bbox.top().unwrap_or(0.0) as f64,
                        bbox.width().unwrap_or(0.0) as f64,
                        bbox.height().unwrap_or(0.0) as f64,
                    ),
                    confidence: detail.confidence().unwrap_or(0.0),
                })
            })
            .collect();

        sort_by_confidence(&mut faces);
        debug!(faces = faces.len(), "Detected faces");
        Ok(faces)
    }
}

/// Order faces most confident first. Ties keep their original order.
pub fn sort_by_confidence(faces: &mut [DetectedFace]) {
    faces.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}
