// Overlay placement and sizing unit tests

use image::{Rgba, RgbaImage};
use image_handler::edits::{OverlaySizing, PlacementOptions, PlacementValue};
use image_handler::imaging::ImageMetadata;
use image_handler::overlay::{overlay_resize, reduce_alpha, resolve_position};
use rstest::rstest;

fn placement(left: Option<&str>, top: Option<&str>) -> PlacementOptions {
    PlacementOptions {
        left: left.map(|v| PlacementValue::Text(v.to_string())),
        top: top.map(|v| PlacementValue::Text(v.to_string())),
    }
}

#[rstest]
#[case(Some("-10p"), Some("30"), (160, 30))]
#[case(Some("0"), Some("-0p"), (0, 0))]
#[case(None, Some("-10"), (0, 80))]
#[case(Some("50p"), Some("50p"), (100, 50))]
#[case(Some("-100p"), None, (-20, 0))]
fn test_resolve_position(
    #[case] left: Option<&str>,
    #[case] top: Option<&str>,
    #[case] expected: (i64, i64),
) {
    let base = ImageMetadata::new(200, 100);
    let overlay = ImageMetadata::new(20, 10);
    assert_eq!(
        resolve_position(&placement(left, top), base, overlay).unwrap(),
        expected
    );
}

#[test]
fn test_overlay_box_from_ratios() {
    let base = ImageMetadata::new(640, 480);
    let sizing = OverlaySizing {
        width_ratio: Some(25.0),
        height_ratio: Some(10.0),
        alpha: None,
    };
    let resize = overlay_resize(sizing, base);
    assert_eq!(resize.width, Some(160));
    assert_eq!(resize.height, Some(48));
}

#[test]
fn test_overlay_box_never_collapses() {
    let base = ImageMetadata::new(3, 3);
    let sizing = OverlaySizing {
        width_ratio: Some(1.0),
        height_ratio: None,
        alpha: None,
    };
    let resize = overlay_resize(sizing, base);
    assert_eq!(resize.width, Some(1));
    assert_eq!(resize.height, None);
}

#[test]
fn test_reduce_alpha() {
    let mut half = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
    reduce_alpha(&mut half, 50.0);
    assert!(half.pixels().all(|p| (127..=128).contains(&p[3])));

    let mut gone = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
    reduce_alpha(&mut gone, 100.0);
    assert!(gone.pixels().all(|p| p[3] == 0));

    let mut untouched = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 200]));
    reduce_alpha(&mut untouched, 0.0);
    assert!(untouched.pixels().all(|p| p[3] == 200));
}
