//! Overlay sizing and opacity.

use image::RgbaImage;
use tracing::debug;

use super::fetcher::OverlayFetcher;
use super::placement::resolve_position;
use crate::edits::{FitMode, OverlaySizing, OverlaySpec, ResizeOptions};
use crate::error::{CollaboratorError, EditError};
use crate::imaging::{ImageHandle, ImageMetadata, Layer};

/// Decode overlay bytes, fit them inside the ratio-constrained box and apply
/// the alpha reduction.
///
/// Failures are reported as collaborator errors, status 500, keeping the
/// underlying error code.
pub fn prepare_overlay(
    data: &[u8],
    sizing: OverlaySizing,
    base: ImageMetadata,
    max_pixels: u64,
) -> Result<RgbaImage, EditError> {
    let mut handle = ImageHandle::open(data, max_pixels).map_err(as_collaborator)?;

    let resize = overlay_resize(sizing, base);
    handle.resize(&resize).map_err(as_collaborator)?;

    let mut overlay = handle.to_rgba8();
    reduce_alpha(&mut overlay, sizing.alpha_percent());
    Ok(overlay)
}

/// Fit-inside resize bounding the overlay by the base image ratios.
///
/// An axis whose ratio is absent or out of range is left unconstrained.
/// Enlarging is allowed.
pub fn overlay_resize(sizing: OverlaySizing, base: ImageMetadata) -> ResizeOptions {
    let constrain = |ratio: Option<f64>, extent: u32| {
        ratio.map(|r| ((extent as f64 * r / 100.0).trunc() as u32).max(1))
    };

    ResizeOptions {
        width: constrain(sizing.width_percent(), base.width),
        height: constrain(sizing.height_percent(), base.height),
        fit: FitMode::Inside,
        ..ResizeOptions::default()
    }
}

/// Multiply every alpha value by `1 - alpha_percent/100`.
pub fn reduce_alpha(overlay: &mut RgbaImage, alpha_percent: f64) {
    if alpha_percent <= 0.0 {
        return;
    }

    let intensity = (255.0 * (1.0 - alpha_percent / 100.0)).clamp(0.0, 255.0) as u16;
    for pixel in overlay.pixels_mut() {
        pixel[3] = ((pixel[3] as u16 * intensity + 127) / 255) as u8;
    }
}

fn as_collaborator(err: EditError) -> EditError {
    match err {
        EditError::Collaborator(_) => err,
        other => EditError::Collaborator(CollaboratorError::new(
            None,
            Some(other.code().to_string()),
            other.to_string(),
        )),
    }
}

/// Fetch, size and position an overlay for a base image of size `base`.
pub async fn build_overlay_layer(
    fetcher: &dyn OverlayFetcher,
    spec: &OverlaySpec,
    base: ImageMetadata,
    max_pixels: u64,
) -> Result<Layer, EditError> {
    let data = fetcher.get(&spec.bucket, &spec.key).await?;
    let overlay = prepare_overlay(&data, spec.sizing(), base, max_pixels)?;

    let size = ImageMetadata::new(overlay.width(), overlay.height());
    let (left, top) = resolve_position(&spec.options, base, size)?;

    debug!(
        bucket = %spec.bucket,
        key = %spec.key,
        width = size.width,
        height = size.height,
        left = left,
        top = top,
        "Resolved overlay placement"
    );

    Ok(Layer::new(overlay, left, top))
}
