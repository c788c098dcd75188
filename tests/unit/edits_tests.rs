// Edit directive parsing unit tests

use image_handler::edits::*;
use image_handler::ImageRequest;
use serde_json::json;

#[test]
fn test_edits_keep_caller_order() {
    let edits = EditSet::from_json(&json!({
        "TEPWatermark": {"options": {"name": "n"}},
        "normalize": true,
        "resize": {"width": 10},
        "flip": true
    }))
    .expect("Failed to parse edits");

    let names: Vec<&str> = edits.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["TEPWatermark", "normalize", "resize", "flip"]);
}

#[test]
fn test_resize_options_shape() {
    let edits = EditSet::from_json(&json!({
        "resize": {
            "width": 300,
            "height": 200,
            "fit": "contain",
            "withoutEnlargement": true,
            "background": {"r": 255, "g": 255, "b": 255, "alpha": 0.5}
        }
    }))
    .unwrap();

    let resize = edits.resize().unwrap();
    assert_eq!(resize.width, Some(300));
    assert_eq!(resize.height, Some(200));
    assert_eq!(resize.fit, FitMode::Contain);
    assert!(resize.without_enlargement);
    assert_eq!(resize.background.unwrap().to_rgba().0, [255, 255, 255, 128]);
}

#[test]
fn test_resize_background_accepts_hex() {
    let edits = EditSet::from_json(&json!({"resize": {"background": "#f00"}})).unwrap();
    let background = edits.resize().unwrap().background.unwrap();
    assert_eq!((background.r, background.g, background.b), (255, 0, 0));
}

#[test]
fn test_invalid_resize_is_rejected() {
    let err = EditSet::from_json(&json!({"resize": {"fit": "squash"}})).unwrap_err();
    assert_eq!(err.code(), "ImageEdits::InvalidParameter");
    assert_eq!(err.status(), 400);
}

#[test]
fn test_overlay_accepts_numeric_strings() {
    let edits = EditSet::from_json(&json!({
        "overlayWith": {
            "bucket": "assets",
            "key": "logo.png",
            "wRatio": "25",
            "hRatio": 40,
            "alpha": "not-a-number",
            "options": {"left": "-10p", "top": 12}
        }
    }))
    .unwrap();

    let EditDirective::Overlay(spec) = &edits.directives()[1] else {
        panic!("expected overlay directive");
    };
    assert_eq!(spec.width_ratio, Some(25.0));
    assert_eq!(spec.height_ratio, Some(40.0));
    assert_eq!(spec.alpha, None);
    assert_eq!(spec.options.left, Some(PlacementValue::Text("-10p".into())));
    assert_eq!(spec.options.top, Some(PlacementValue::Number(12.0)));
}

#[test]
fn test_out_of_range_ratios_are_ignored() {
    let sizing = OverlaySizing {
        width_ratio: Some(150.0),
        height_ratio: Some(-5.0),
        alpha: Some(120.0),
    };
    assert_eq!(sizing.width_percent(), None);
    assert_eq!(sizing.height_percent(), None);
}

#[test]
fn test_overlay_requires_bucket_and_key() {
    assert!(EditSet::from_json(&json!({"overlayWith": {"key": "k"}})).is_err());
}

#[test]
fn test_watermark_style_defaults_to_banner() {
    let edits = EditSet::from_json(&json!({
        "TEPWatermark": {"options": {"name": "Bob", "style": "fancy"}}
    }))
    .unwrap();
    let EditDirective::Watermark(spec) = &edits.directives()[1] else {
        panic!("expected watermark directive");
    };
    assert_eq!(spec.options.style, WatermarkStyle::Banner);
    assert_eq!(spec.brand_location(), None);
}

#[test]
fn test_watermark_brand_location_needs_both_parts() {
    let edits = EditSet::from_json(&json!({
        "TEPWatermark": {"bucket": "b", "key": "", "options": {"name": "x", "style": "cute"}}
    }))
    .unwrap();
    let EditDirective::Watermark(spec) = &edits.directives()[1] else {
        panic!("expected watermark directive");
    };
    assert_eq!(spec.options.style, WatermarkStyle::Cute);
    assert_eq!(spec.brand_location(), None);
}

#[test]
fn test_smart_crop_options() {
    let edits = EditSet::from_json(&json!({"smartCrop": {"faceIndex": 2, "padding": 8}})).unwrap();
    let EditDirective::SmartCrop(options) = &edits.directives()[1] else {
        panic!("expected smart crop directive");
    };
    assert_eq!(options.face_index(), 2);
    assert_eq!(options.padding(), 8.0);
}

#[test]
fn test_rotate_values() {
    let parse = |v| EditDirective::parse("rotate", &v);
    assert_eq!(parse(json!(90)).unwrap(), EditDirective::Rotate(Some(90)));
    assert_eq!(parse(json!(-90)).unwrap(), EditDirective::Rotate(Some(-90)));
    assert_eq!(parse(json!(null)).unwrap(), EditDirective::Rotate(None));
    assert_eq!(parse(json!(false)).unwrap(), EditDirective::Rotate(Some(0)));
    assert!(parse(json!(45.5)).is_err());
    assert!(parse(json!("90")).is_err());
}

#[test]
fn test_request_body_parsing() {
    let request = ImageRequest::from_json(
        vec![0u8; 4],
        r#"{"edits": {"smartCrop": true}, "outputFormat": "jpg"}"#,
    )
    .unwrap();
    assert!(request.applicable_edits().is_some());
    assert_eq!(request.edits.unwrap().requested_len(), 1);
}

#[test]
fn test_parse_hex_color_errors() {
    assert!(parse_hex_color("fff").is_err());
    assert!(parse_hex_color("#ffff").is_err());
    assert!(parse_hex_color("#ggg").is_err());
    assert_eq!(parse_hex_color("#102030").unwrap().b, 0x30);
}
