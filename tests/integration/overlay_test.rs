// overlayWith: fetch, sizing, placement and opacity

use super::test_harness::*;
use image_handler::EditSet;
use serde_json::json;
use std::sync::Arc;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn store_with_logo(size: u32) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::default().with_object("assets", "logo.png", solid_png(size, size, RED)))
}

#[tokio::test]
async fn test_overlay_placed_from_far_edge() {
    let store = store_with_logo(20);
    let handler = handler(store.clone(), Arc::new(FixedFaces::default()));

    let set = EditSet::from_json(&json!({
        "overlayWith": {
            "bucket": "assets",
            "key": "logo.png",
            "wRatio": 10,
            "options": {"left": "-10p", "top": "30"}
        }
    }))
    .unwrap();
    let handle = handler
        .apply(&solid_png(200, 100, BLUE), &set)
        .await
        .unwrap();

    assert_eq!(store.gets(), 1);
    let out = handle.to_rgba8();
    assert_eq!(out.dimensions(), (200, 100));
    // 20x20 overlay at (160, 30)
    assert_eq!(out.get_pixel(160, 30).0, RED);
    assert_eq!(out.get_pixel(179, 49).0, RED);
    assert_eq!(out.get_pixel(159, 30).0, BLUE);
    assert_eq!(out.get_pixel(180, 30).0, BLUE);
    assert_eq!(out.get_pixel(160, 29).0, BLUE);
}

#[tokio::test]
async fn test_overlay_sees_final_dimensions() {
    let handler = handler(store_with_logo(10), Arc::new(FixedFaces::default()));

    // resize listed after the overlay still determines the base geometry
    let set = EditSet::from_json(&json!({
        "overlayWith": {"bucket": "assets", "key": "logo.png", "wRatio": 10, "options": {"left": "-0"}},
        "resize": {"width": 100}
    }))
    .unwrap();
    let handle = handler
        .apply(&solid_png(400, 200, BLUE), &set)
        .await
        .unwrap();

    let out = handle.to_rgba8();
    assert_eq!(out.dimensions(), (100, 50));
    assert_eq!(out.get_pixel(0, 0).0, RED);
    assert_eq!(out.get_pixel(9, 9).0, RED);
    assert!(close_to(out.get_pixel(10, 0).0, BLUE));
}

#[tokio::test]
async fn test_overlay_fully_transparent_at_alpha_hundred() {
    let handler = handler(store_with_logo(10), Arc::new(FixedFaces::default()));

    let set = EditSet::from_json(&json!({
        "overlayWith": {"bucket": "assets", "key": "logo.png", "alpha": 100}
    }))
    .unwrap();
    let handle = handler
        .apply(&solid_png(50, 50, BLUE), &set)
        .await
        .unwrap();
    assert!(handle.to_rgba8().pixels().all(|p| p.0 == BLUE));
}

#[tokio::test]
async fn test_overlay_outside_canvas_is_clipped() {
    let handler = handler(store_with_logo(20), Arc::new(FixedFaces::default()));

    let set = EditSet::from_json(&json!({
        "overlayWith": {"bucket": "assets", "key": "logo.png", "options": {"left": 40, "top": 40}}
    }))
    .unwrap();
    let handle = handler
        .apply(&solid_png(50, 50, BLUE), &set)
        .await
        .unwrap();

    let out = handle.to_rgba8();
    assert_eq!(out.dimensions(), (50, 50));
    assert_eq!(out.get_pixel(49, 49).0, RED);
    assert_eq!(out.get_pixel(39, 39).0, BLUE);
}

#[tokio::test]
async fn test_overlay_at_extreme_offset_leaves_base_untouched() {
    let handler = handler(store_with_logo(20), Arc::new(FixedFaces::default()));

    for (left, top) in [
        (json!("9223372036854775807"), json!("0")),
        (json!(0), json!("9223372036854775807")),
        (json!("-9223372036854775807"), json!("-9223372036854775807")),
    ] {
        let set = EditSet::from_json(&json!({
            "overlayWith": {"bucket": "assets", "key": "logo.png", "options": {"left": left, "top": top}}
        }))
        .unwrap();
        let handle = handler
            .apply(&solid_png(200, 100, BLUE), &set)
            .await
            .unwrap();
        let out = handle.to_rgba8();
        assert_eq!(out.dimensions(), (200, 100));
        assert!(out.pixels().all(|p| p.0 == BLUE));
    }
}

#[tokio::test]
async fn test_missing_overlay_surfaces_storage_error() {
    let handler = handler(
        Arc::new(MemoryStore::default()),
        Arc::new(FixedFaces::default()),
    );

    let set = EditSet::from_json(&json!({
        "overlayWith": {"bucket": "assets", "key": "missing.png"}
    }))
    .unwrap();
    let err = handler
        .apply(&solid_png(50, 50, BLUE), &set)
        .await
        .unwrap_err();
    assert_eq!(err.status(), 404);
    assert_eq!(err.code(), "NoSuchKey");
}

#[tokio::test]
async fn test_undecodable_overlay_is_a_collaborator_error() {
    let store = Arc::new(MemoryStore::default().with_object("assets", "bad.png", b"nope".to_vec()));
    let handler = handler(store, Arc::new(FixedFaces::default()));

    let set = EditSet::from_json(&json!({
        "overlayWith": {"bucket": "assets", "key": "bad.png"}
    }))
    .unwrap();
    let err = handler
        .apply(&solid_png(50, 50, BLUE), &set)
        .await
        .unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.code(), "ImageEdits::DecodeFailed");
}
