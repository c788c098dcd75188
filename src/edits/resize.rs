//! Resize directive and fit arithmetic.
//!
//! `ResizeOptions::plan` is the single place that decides the dimensions a
//! resize produces. The image handle uses it to drive the actual resampling
//! and the pipeline uses it to know the final dimensions before placing
//! overlays and watermarks.

use serde::Deserialize;

use super::options::Color;
use crate::imaging::ImageMetadata;

/// How to fit the image within target dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Scale to cover both dimensions, then crop the overflow (default)
    #[default]
    Cover,
    /// Scale to fit within both dimensions, then letterbox with `background`
    Contain,
    /// Stretch to exactly the target dimensions
    Fill,
    /// Scale to fit within both dimensions, preserving aspect ratio
    Inside,
    /// Scale to cover both dimensions, preserving aspect ratio, no crop
    Outside,
}

/// Parameters of a `resize` edit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeOptions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fit: FitMode,
    /// Never produce an image larger than the source
    #[serde(default)]
    pub without_enlargement: bool,
    /// Letterbox colour for `contain`
    #[serde(default)]
    pub background: Option<Color>,
}

impl ResizeOptions {
    /// The directive injected when the caller asked for no resize.
    pub fn fit_inside() -> Self {
        Self {
            fit: FitMode::Inside,
            ..Self::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    /// Work out the resample size and the final canvas size for `original`.
    pub fn plan(&self, original: ImageMetadata) -> ResizePlan {
        let unchanged = ResizePlan {
            scaled: original,
            output: original,
        };

        let ow = original.width.max(1) as f64;
        let oh = original.height.max(1) as f64;

        let plan = match (self.width, self.height) {
            (None, None) => return unchanged,
            (Some(w), None) => {
                let size = dims(w as f64, oh * w as f64 / ow);
                ResizePlan::uniform(size)
            }
            (None, Some(h)) => {
                let size = dims(ow * h as f64 / oh, h as f64);
                ResizePlan::uniform(size)
            }
            (Some(w), Some(h)) => {
                let target = dims(w as f64, h as f64);
                let scale_w = w as f64 / ow;
                let scale_h = h as f64 / oh;
                match self.fit {
                    FitMode::Fill => ResizePlan::uniform(target),
                    FitMode::Inside => ResizePlan::uniform(scaled(ow, oh, scale_w.min(scale_h))),
                    FitMode::Outside => ResizePlan::uniform(scaled(ow, oh, scale_w.max(scale_h))),
                    FitMode::Cover => ResizePlan {
                        scaled: scaled(ow, oh, scale_w.max(scale_h)),
                        output: target,
                    },
                    FitMode::Contain => ResizePlan {
                        scaled: scaled(ow, oh, scale_w.min(scale_h)),
                        output: target,
                    },
                }
            }
        };

        if self.without_enlargement
            && (plan.scaled.width > original.width || plan.scaled.height > original.height)
        {
            return unchanged;
        }

        plan
    }
}

/// Outcome of [`ResizeOptions::plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    /// Size the source is resampled to
    pub scaled: ImageMetadata,
    /// Size of the final image (differs from `scaled` for cover/contain)
    pub output: ImageMetadata,
}

impl ResizePlan {
    fn uniform(size: ImageMetadata) -> Self {
        Self {
            scaled: size,
            output: size,
        }
    }
}

fn dims(width: f64, height: f64) -> ImageMetadata {
    ImageMetadata::new((width.round() as u32).max(1), (height.round() as u32).max(1))
}

fn scaled(width: f64, height: f64, factor: f64) -> ImageMetadata {
    dims(width * factor, height * factor)
}
