//! Image handling
//!
//! Decode, transform and encode images:
//! - `handle`: decoded image with resize, extract, composite, rotate and encode
//! - `operations`: named pass-through operations (flip, blur, tint, ...)
//! - `compositor`: layer blending with clipping
//! - `encoder`: per-format encoders
//!
//! Built on the `image` crate, with `fast_image_resize` for resampling and
//! `ravif` for AVIF output.

pub mod compositor;
pub mod encoder;
pub mod format;
pub mod geometry;
pub mod handle;
pub mod operations;
pub mod orientation;

pub use compositor::{Compositor, Layer};
pub use encoder::{EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use format::OutputFormat;
pub use geometry::{CropRect, ImageMetadata};
pub use handle::{ensure_within_limit, resample, ImageHandle, DEFAULT_MAX_PIXELS};
