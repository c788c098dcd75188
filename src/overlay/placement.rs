//! Position calculation for overlay placement.
//!
//! Each axis is resolved independently from a `left`/`top` value:
//!
//! | value   | meaning                                             |
//! |---------|-----------------------------------------------------|
//! | `30`    | 30px from the near edge                             |
//! | `-30`   | far edge lands 30px in from the far edge            |
//! | `"10p"` | 10% of the base dimension from the near edge        |
//! | `"-10p"`| far edge lands 10% in from the base's far edge      |
//!
//! # Example
//!
//! ```
//! use image_handler::edits::{PlacementOptions, PlacementValue};
//! use image_handler::imaging::ImageMetadata;
//! use image_handler::overlay::resolve_position;
//!
//! let options = PlacementOptions {
//!     left: Some(PlacementValue::Text("-10p".into())),
//!     top: Some(PlacementValue::Number(30.0)),
//! };
//! let base = ImageMetadata::new(200, 100);
//! let overlay = ImageMetadata::new(20, 10);
//!
//! assert_eq!(resolve_position(&options, base, overlay).unwrap(), (160, 30));
//! ```

use crate::edits::{PlacementOptions, PlacementValue};
use crate::error::EditError;
use crate::imaging::ImageMetadata;

const PERCENT_SUFFIX: char = 'p';

/// Resolve one axis. `base` and `overlay` are the extents on that axis.
///
/// Absent values place the overlay at 0.
pub fn resolve_offset(
    value: Option<&PlacementValue>,
    base: u32,
    overlay: u32,
) -> Result<i64, EditError> {
    let Some(value) = value else {
        return Ok(0);
    };

    let base = base as f64;
    let overlay = overlay as f64;

    let absolute = match value {
        PlacementValue::Number(v) => pixel_offset(v.trunc(), base, overlay),
        PlacementValue::Text(text) => {
            let text = text.trim();
            match text.strip_suffix(PERCENT_SUFFIX) {
                Some(percent) => {
                    let p = parse_integer(percent, text)?;
                    if p < 0.0 {
                        base + base * p / 100.0 - overlay
                    } else {
                        base * p / 100.0
                    }
                }
                None => pixel_offset(parse_integer(text, text)?, base, overlay),
            }
        }
    };

    Ok(absolute.trunc() as i64)
}

fn pixel_offset(v: f64, base: f64, overlay: f64) -> f64 {
    if v < 0.0 {
        base + v - overlay
    } else {
        v
    }
}

fn parse_integer(number: &str, original: &str) -> Result<f64, EditError> {
    number
        .trim()
        .parse::<f64>()
        .map(f64::trunc)
        .map_err(|_| {
            EditError::invalid_param("overlayWith", format!("invalid placement: {}", original))
        })
}

/// Resolve `left` and `top` for an overlay of size `overlay` on `base`.
pub fn resolve_position(
    options: &PlacementOptions,
    base: ImageMetadata,
    overlay: ImageMetadata,
) -> Result<(i64, i64), EditError> {
    let left = resolve_offset(options.left.as_ref(), base.width, overlay.width)?;
    let top = resolve_offset(options.top.as_ref(), base.height, overlay.height)?;
    Ok((left, top))
}
