// smartCrop: detection, face selection and padding bounds

use super::test_harness::*;
use image_handler::{EditError, EditSet};
use serde_json::json;
use std::sync::Arc;

fn crop_handler(faces: FixedFaces) -> (image_handler::ImageHandler, Arc<FixedFaces>) {
    let faces = Arc::new(faces);
    (
        handler(Arc::new(MemoryStore::default()), faces.clone()),
        faces,
    )
}

#[tokio::test]
async fn test_crops_highest_confidence_face_with_padding() {
    let (handler, faces) = crop_handler(FixedFaces::new(&[
        (0.1, 0.2, 0.5, 0.4),
        (0.0, 0.0, 0.1, 0.1),
    ]));

    let set = EditSet::from_json(&json!({"smartCrop": {"padding": 5}})).unwrap();
    let handle = handler
        .apply(&solid_png(300, 200, [50, 60, 70, 255]), &set)
        .await
        .unwrap();

    assert_eq!(faces.calls(), 1);
    assert_eq!((handle.metadata().width, handle.metadata().height), (160, 90));
}

#[tokio::test]
async fn test_face_index_selects_second_face() {
    let (handler, _) = crop_handler(FixedFaces::new(&[
        (0.1, 0.2, 0.5, 0.4),
        (0.0, 0.0, 0.1, 0.1),
    ]));

    let set = EditSet::from_json(&json!({"smartCrop": {"faceIndex": 1}})).unwrap();
    let handle = handler
        .apply(&solid_png(300, 200, [50, 60, 70, 255]), &set)
        .await
        .unwrap();
    assert_eq!((handle.metadata().width, handle.metadata().height), (30, 20));
}

#[tokio::test]
async fn test_face_index_out_of_range() {
    let (handler, _) = crop_handler(FixedFaces::new(&[(0.1, 0.2, 0.5, 0.4)]));

    let set = EditSet::from_json(&json!({"smartCrop": {"faceIndex": 2}})).unwrap();
    let err = handler
        .apply(&solid_png(300, 200, [50, 60, 70, 255]), &set)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EditError::SmartCropFaceIndexOutOfRange {
            index: 2,
            detected: 1
        }
    ));
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_padding_past_the_edge_is_rejected() {
    let (handler, _) = crop_handler(FixedFaces::new(&[(0.0, 0.0, 0.5, 0.5)]));

    let set = EditSet::from_json(&json!({"smartCrop": {"padding": 1}})).unwrap();
    let err = handler
        .apply(&solid_png(100, 100, [50, 60, 70, 255]), &set)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SmartCrop::PaddingOutOfBounds");
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_no_faces_fails_for_any_index() {
    let (handler, faces) = crop_handler(FixedFaces::default());

    let set = EditSet::from_json(&json!({"smartCrop": {"faceIndex": 3}})).unwrap();
    let err = handler
        .apply(&solid_png(64, 48, [50, 60, 70, 255]), &set)
        .await
        .unwrap_err();
    assert_eq!(faces.calls(), 1);
    assert_eq!(err.code(), "SmartCrop::FaceIndexOutOfRange");
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_detection_runs_on_resized_image() {
    let (handler, _) = crop_handler(FixedFaces::new(&[(0.25, 0.25, 0.5, 0.5)]));

    let set = EditSet::from_json(&json!({
        "smartCrop": {"padding": 0},
        "resize": {"width": 100, "height": 100, "fit": "fill"}
    }))
    .unwrap();
    let handle = handler
        .apply(&solid_png(400, 300, [50, 60, 70, 255]), &set)
        .await
        .unwrap();
    assert_eq!((handle.metadata().width, handle.metadata().height), (50, 50));
}
