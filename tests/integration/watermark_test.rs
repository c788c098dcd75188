// TEPWatermark: width thresholds, placement and brand fetching

use super::test_harness::*;
use image_handler::EditSet;
use serde_json::json;
use std::sync::Arc;

const GREEN: [u8; 4] = [0, 128, 0, 255];

fn watermark(style: &str) -> EditSet {
    EditSet::from_json(&json!({
        "TEPWatermark": {"options": {"name": "Ada", "style": style}}
    }))
    .unwrap()
}

async fn changed_pixels(width: u32, height: u32, set: &EditSet) -> usize {
    let handle = default_handler()
        .apply(&solid_png(width, height, GREEN), set)
        .await
        .unwrap();
    handle.to_rgba8().pixels().filter(|p| p.0 != GREEN).count()
}

#[tokio::test]
async fn test_narrow_image_is_never_watermarked() {
    assert_eq!(changed_pixels(100, 100, &watermark("cute")).await, 0);
    assert_eq!(changed_pixels(100, 100, &watermark("banner")).await, 0);
}

#[tokio::test]
async fn test_cute_style_applies_above_150() {
    assert!(changed_pixels(200, 200, &watermark("cute")).await > 0);
}

#[tokio::test]
async fn test_banner_style_needs_more_than_340() {
    assert_eq!(changed_pixels(200, 200, &watermark("banner")).await, 0);
    assert_eq!(changed_pixels(340, 100, &watermark("banner")).await, 0);
    assert!(changed_pixels(400, 100, &watermark("banner")).await > 0);
}

#[tokio::test]
async fn test_watermark_anchored_bottom_right() {
    let handle = default_handler()
        .apply(&solid_png(500, 300, GREEN), &watermark("banner"))
        .await
        .unwrap();
    let out = handle.to_rgba8();

    // banner occupies (160..500, 236..300)
    let outside = out
        .enumerate_pixels()
        .filter(|(x, y, p)| (*x < 160 || *y < 236) && p.0 != GREEN)
        .count();
    assert_eq!(outside, 0);
    assert!(out
        .enumerate_pixels()
        .any(|(x, y, p)| x >= 160 && y >= 236 && p.0 != GREEN));
}

#[tokio::test]
async fn test_watermark_threshold_uses_post_resize_width() {
    // 1000px source shrunk to 300px: too narrow for the banner
    let set = EditSet::from_json(&json!({
        "TEPWatermark": {"options": {"name": "Ada"}},
        "resize": {"width": 300}
    }))
    .unwrap();
    let handle = default_handler()
        .apply(&solid_png(1000, 200, GREEN), &set)
        .await
        .unwrap();
    let out = handle.to_rgba8();
    assert_eq!(out.dimensions(), (300, 60));
    assert!(out.pixels().all(|p| close_to(p.0, GREEN)));
}

#[tokio::test]
async fn test_watermark_fully_transparent_at_alpha_hundred() {
    let set = EditSet::from_json(&json!({
        "TEPWatermark": {"alpha": 100, "options": {"name": "Ada", "style": "cute"}}
    }))
    .unwrap();
    assert_eq!(changed_pixels(400, 400, &set).await, 0);
}

#[tokio::test]
async fn test_brand_image_is_fetched_from_storage() {
    let store = Arc::new(MemoryStore::default().with_object(
        "brand",
        "mark.png",
        solid_png(64, 64, [255, 0, 255, 255]),
    ));
    let handler = handler(store.clone(), Arc::new(FixedFaces::default()));

    let set = EditSet::from_json(&json!({
        "TEPWatermark": {"bucket": "brand", "key": "mark.png", "options": {"name": "Ada", "style": "cute"}}
    }))
    .unwrap();
    handler
        .apply(&solid_png(300, 300, GREEN), &set)
        .await
        .unwrap();
    assert_eq!(store.gets(), 1);
}

#[tokio::test]
async fn test_narrow_image_skips_brand_fetch() {
    let store = Arc::new(MemoryStore::default());
    let handler = handler(store.clone(), Arc::new(FixedFaces::default()));

    let set = EditSet::from_json(&json!({
        "TEPWatermark": {"bucket": "brand", "key": "missing.png", "options": {"name": "Ada"}}
    }))
    .unwrap();
    handler
        .apply(&solid_png(120, 120, GREEN), &set)
        .await
        .unwrap();
    assert_eq!(store.gets(), 0);
}

#[tokio::test]
async fn test_watermark_disabled_leaves_image_untouched() {
    let handler = default_handler().with_watermark_enabled(false);
    let handle = handler
        .apply(&solid_png(400, 100, GREEN), &watermark("banner"))
        .await
        .unwrap();
    assert!(handle.to_rgba8().pixels().all(|p| p.0 == GREEN));
}
