// Output format selection and encoding

use super::test_harness::*;
use image_handler::{EditSet, ImageRequest, OutputFormat};
use serde_json::json;

fn request(original: Vec<u8>, edits: serde_json::Value) -> ImageRequest {
    ImageRequest::new(original).with_edits(EditSet::from_json(&edits).unwrap())
}

async fn output_format(request: &ImageRequest) -> Option<OutputFormat> {
    let encoded = default_handler().process(request).await.unwrap();
    OutputFormat::detect(&decode_base64(&encoded))
}

#[tokio::test]
async fn test_source_format_is_kept_by_default() {
    let png = request(solid_png(16, 16, [1, 2, 3, 255]), json!({"flip": true}));
    assert_eq!(output_format(&png).await, Some(OutputFormat::Png));

    let jpeg = request(solid_jpeg(16, 16, [1, 2, 3, 255]), json!({"flip": true}));
    assert_eq!(output_format(&jpeg).await, Some(OutputFormat::Jpeg));
}

#[tokio::test]
async fn test_to_format_edit_changes_output() {
    let req = request(solid_png(16, 16, [1, 2, 3, 255]), json!({"toFormat": "jpeg"}));
    assert_eq!(output_format(&req).await, Some(OutputFormat::Jpeg));
}

#[tokio::test]
async fn test_requested_format_wins_over_to_format() {
    let req = request(
        solid_png(16, 16, [1, 2, 3, 255]),
        json!({"toFormat": "jpeg"}),
    )
    .with_output_format(OutputFormat::WebP);
    assert_eq!(output_format(&req).await, Some(OutputFormat::WebP));
}

#[tokio::test]
async fn test_output_decodes_with_edits_applied() {
    let req = request(
        solid_png(40, 20, [10, 20, 30, 255]),
        json!({"resize": {"width": 20}, "rotate": 90}),
    )
    .with_output_format(OutputFormat::Png);

    let encoded = default_handler().process(&req).await.unwrap();
    let out = decode(&decode_base64(&encoded));
    assert_eq!(out.dimensions(), (10, 20));
}

#[tokio::test]
async fn test_invalid_to_format_is_rejected() {
    let req = request(solid_png(4, 4, [0, 0, 0, 255]), json!({"toFormat": "bmp"}));
    let err = default_handler().process(&req).await.unwrap_err();
    assert_eq!(err.status(), 400);
}
