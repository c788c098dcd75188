//! Decoded image plus the format and orientation state carried through a
//! pipeline run.
//!
//! Handles the pixel work: decode → resize/extract/composite/rotate → encode

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::{imageops, DynamicImage, GenericImageView, RgbaImage};
use std::io::Cursor;
use std::num::NonZeroU32;
use tracing::{debug, warn};

use super::compositor::{Compositor, Layer};
use super::encoder::{EncodedImage, EncoderFactory, EncoderQuality};
use super::format::OutputFormat;
use super::geometry::{CropRect, ImageMetadata};
use super::orientation::{apply_orientation, read_orientation};
use crate::edits::{Color, FitMode, ResizeOptions};
use crate::error::EditError;

/// Pixel limit for handles built without an explicit one.
pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

/// A decoded image being edited.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pub(super) image: DynamicImage,
    source_format: Option<OutputFormat>,
    pub(super) target_format: Option<OutputFormat>,
    orientation: Option<u32>,
    max_pixels: u64,
}

/// Fail with `ImageTooLarge` when `size` holds more than `max_pixels` pixels.
pub fn ensure_within_limit(size: ImageMetadata, max_pixels: u64) -> Result<(), EditError> {
    if size.pixels() > max_pixels {
        return Err(EditError::ImageTooLarge {
            width: size.width,
            height: size.height,
            max_pixels,
        });
    }
    Ok(())
}

impl ImageHandle {
    /// Decode `data`, rejecting images whose header declares more than
    /// `max_pixels` pixels. Later resizes are held to the same limit.
    ///
    /// Decoding is tolerant: when the header is readable but the pixel data
    /// is damaged, the handle holds a transparent canvas of the declared size.
    pub fn open(data: &[u8], max_pixels: u64) -> Result<Self, EditError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| EditError::decode_failed(e.to_string()))?;
        let source_format = reader.format().and_then(OutputFormat::from_image_format);

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| EditError::decode_failed(e.to_string()))?;

        ensure_within_limit(ImageMetadata::new(width, height), max_pixels)?;

        let decoded = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| EditError::decode_failed(e.to_string()))?
            .decode();

        let image = match decoded {
            Ok(image) => image,
            Err(e) => {
                warn!(
                    width = width,
                    height = height,
                    error = %e,
                    "Image body failed to decode, continuing with a blank canvas"
                );
                DynamicImage::ImageRgba8(RgbaImage::new(width.max(1), height.max(1)))
            }
        };

        debug!(
            width = width,
            height = height,
            format = ?source_format,
            "Decoded source image"
        );

        Ok(Self {
            image,
            source_format,
            target_format: None,
            orientation: read_orientation(data),
            max_pixels,
        })
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            source_format: None,
            target_format: None,
            orientation: None,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    pub fn metadata(&self) -> ImageMetadata {
        let (width, height) = self.image.dimensions();
        ImageMetadata::new(width, height)
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }

    pub fn to_rgba8(&self) -> RgbaImage {
        self.image.to_rgba8()
    }

    pub fn source_format(&self) -> Option<OutputFormat> {
        self.source_format
    }

    /// Format requested by a `toFormat` edit, if any.
    pub fn target_format(&self) -> Option<OutputFormat> {
        self.target_format
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.target_format = Some(format);
    }

    /// Resolve the encode format: explicit request, then `toFormat`, then the
    /// source format, then `fallback`.
    pub fn output_format(
        &self,
        requested: Option<OutputFormat>,
        fallback: OutputFormat,
    ) -> OutputFormat {
        requested
            .or(self.target_format)
            .or(self.source_format)
            .unwrap_or(fallback)
    }

    /// Apply a resize directive.
    pub fn resize(&mut self, options: &ResizeOptions) -> Result<(), EditError> {
        let current = self.metadata();
        let plan = options.plan(current);
        if plan.scaled == current && plan.output == current {
            return Ok(());
        }
        ensure_within_limit(plan.scaled, self.max_pixels)?;
        ensure_within_limit(plan.output, self.max_pixels)?;

        let scaled = if plan.scaled == current {
            self.image.to_rgba8()
        } else {
            resample(&self.image, plan.scaled)?
        };

        let output = if plan.output == plan.scaled {
            scaled
        } else if options.fit == FitMode::Cover {
            let left = (plan.scaled.width.saturating_sub(plan.output.width)) / 2;
            let top = (plan.scaled.height.saturating_sub(plan.output.height)) / 2;
            imageops::crop_imm(&scaled, left, top, plan.output.width, plan.output.height)
                .to_image()
        } else {
            let background = options.background.unwrap_or(Color::BLACK).to_rgba();
            let mut canvas =
                RgbaImage::from_pixel(plan.output.width, plan.output.height, background);
            let left = (plan.output.width as i64 - plan.scaled.width as i64) / 2;
            let top = (plan.output.height as i64 - plan.scaled.height as i64) / 2;
            imageops::replace(&mut canvas, &scaled, left, top);
            canvas
        };

        debug!(
            from = ?(current.width, current.height),
            to = ?(output.width(), output.height()),
            fit = ?options.fit,
            "Resized image"
        );

        self.image = DynamicImage::ImageRgba8(output);
        Ok(())
    }

    /// Cut `rect` out of the image. Fails unless the rectangle lies entirely
    /// within the current dimensions.
    pub fn extract(&mut self, rect: CropRect) -> Result<(), EditError> {
        let bounds = self.metadata();
        if !rect.fits_within(bounds) {
            return Err(EditError::processing(
                "extract",
                format!(
                    "area {}x{} at ({}, {}) is outside the {}x{} image",
                    rect.width, rect.height, rect.left, rect.top, bounds.width, bounds.height
                ),
            ));
        }

        self.image = self.image.crop_imm(
            rect.left as u32,
            rect.top as u32,
            rect.width as u32,
            rect.height as u32,
        );
        Ok(())
    }

    /// Blend `layers` onto the image in order.
    pub fn composite(&mut self, layers: Vec<Layer>) {
        if layers.is_empty() {
            return;
        }

        let mut compositor = Compositor::new();
        for layer in layers {
            compositor.add_layer(layer);
        }

        let mut base = self.image.to_rgba8();
        compositor.apply(&mut base);
        self.image = DynamicImage::ImageRgba8(base);
    }

    /// Rotate by a multiple of 90 degrees, or auto-orient from EXIF when
    /// `angle` is `None`.
    pub fn rotate(&mut self, angle: Option<i64>) -> Result<(), EditError> {
        let image = std::mem::replace(&mut self.image, DynamicImage::new_rgba8(0, 0));

        let rotated = match angle {
            None => apply_orientation(image, self.orientation.take().unwrap_or(1)),
            Some(degrees) => match degrees.rem_euclid(360) {
                0 => image,
                90 => image.rotate90(),
                180 => image.rotate180(),
                270 => image.rotate270(),
                _ => {
                    self.image = image;
                    return Err(EditError::invalid_param(
                        "rotate",
                        format!("angle must be a multiple of 90, got {}", degrees),
                    ));
                }
            },
        };

        self.image = rotated;
        Ok(())
    }

    /// Encode the current pixels.
    pub fn encode(&self, format: OutputFormat, quality: u8) -> Result<EncodedImage, EditError> {
        let encoder = EncoderFactory::create(format);
        let rgba = self.image.to_rgba8();
        let (width, height) = rgba.dimensions();
        encoder.encode(
            &rgba.into_raw(),
            width,
            height,
            EncoderQuality::with_quality(quality),
        )
    }
}

/// Resample with fast-image-resize using the Lanczos3 filter.
///
/// Alpha is premultiplied around the convolution so transparent pixels do
/// not bleed their colour into neighbours.
pub fn resample(img: &DynamicImage, target: ImageMetadata) -> Result<RgbaImage, EditError> {
    let (src_w, src_h) = img.dimensions();

    let src_width = NonZeroU32::new(src_w).ok_or_else(|| resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(src_h).ok_or_else(|| resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target.width).ok_or_else(|| resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target.height).ok_or_else(|| resize_failed("Target height is 0"))?;

    let mut src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let alpha_mul_div = MulDiv::default();
    alpha_mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| resize_failed(format!("Failed to premultiply alpha: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| resize_failed(format!("Resize operation failed: {:?}", e)))?;

    alpha_mul_div
        .divide_alpha_inplace(&mut dst_image.view_mut())
        .map_err(|e| resize_failed(format!("Failed to restore alpha: {:?}", e)))?;

    RgbaImage::from_raw(target.width, target.height, dst_image.into_vec())
        .ok_or_else(|| resize_failed("Failed to create output image buffer"))
}

fn resize_failed(message: impl Into<String>) -> EditError {
    EditError::processing("resize", message)
}
