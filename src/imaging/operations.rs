//! Named pass-through operations
//!
//! Edits that are neither resize, rotate, overlay, smart crop nor watermark
//! are looked up here by name. Boolean parameters follow one rule
//! throughout: `false` disables the operation, `true` and `null` enable it
//! with default settings.

use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use super::format::OutputFormat;
use super::geometry::CropRect;
use super::handle::ImageHandle;
use crate::edits::Color;
use crate::error::EditError;

#[derive(Debug, Deserialize)]
struct ExtractArea {
    left: i64,
    top: i64,
    width: i64,
    height: i64,
}

#[derive(Debug, Default, Deserialize)]
struct FlattenOptions {
    #[serde(default)]
    background: Option<Color>,
}

impl ImageHandle {
    /// Apply the operation called `name` with its JSON parameters.
    pub fn apply_operation(&mut self, name: &str, params: &Value) -> Result<(), EditError> {
        match name {
            "flip" => {
                if enabled(name, params)? {
                    self.image = self.image.flipv();
                }
            }
            "flop" => {
                if enabled(name, params)? {
                    self.image = self.image.fliph();
                }
            }
            "grayscale" | "greyscale" => {
                if enabled(name, params)? {
                    self.image = self.image.grayscale();
                }
            }
            "negate" => {
                if enabled(name, params)? {
                    self.image.invert();
                }
            }
            "blur" => {
                if let Some(sigma) = sigma(name, params, 1.0)? {
                    self.image = self.image.blur(sigma);
                }
            }
            "sharpen" => {
                if let Some(sigma) = sigma(name, params, 1.0)? {
                    self.image = self.image.unsharpen(sigma, 1);
                }
            }
            "flatten" => {
                let options = match params {
                    Value::Bool(false) => return Ok(()),
                    Value::Null | Value::Bool(true) => FlattenOptions::default(),
                    other => parse(name, other)?,
                };
                let background = options.background.unwrap_or(Color::BLACK);
                self.image = DynamicImage::ImageRgb8(
                    DynamicImage::ImageRgba8(flatten(&self.image, background)).to_rgb8(),
                );
            }
            "tint" => {
                let color: Color = parse(name, params)?;
                self.image = DynamicImage::ImageRgba8(tint(&self.image, color));
            }
            "normalize" | "normalise" => {
                if enabled(name, params)? {
                    self.image = DynamicImage::ImageRgba8(normalize(&self.image));
                }
            }
            "extract" => {
                let area: ExtractArea = parse(name, params)?;
                self.extract(CropRect::new(area.left, area.top, area.width, area.height))?;
            }
            "toFormat" => {
                let format = match params {
                    Value::String(s) => OutputFormat::from_str(s)?,
                    Value::Object(map) => match map.get("format").and_then(Value::as_str) {
                        Some(s) => OutputFormat::from_str(s)?,
                        None => {
                            return Err(EditError::invalid_param(name, "missing format"));
                        }
                    },
                    other => {
                        return Err(EditError::invalid_param(
                            name,
                            format!("expected a format name, got {}", other),
                        ));
                    }
                };
                self.set_format(format);
            }
            _ => {
                return Err(EditError::UnsupportedEdit {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

fn parse<T: for<'de> Deserialize<'de>>(name: &str, params: &Value) -> Result<T, EditError> {
    T::deserialize(params).map_err(|e| EditError::invalid_param(name, e.to_string()))
}

fn enabled(name: &str, params: &Value) -> Result<bool, EditError> {
    match params {
        Value::Null | Value::Bool(true) => Ok(true),
        Value::Bool(false) => Ok(false),
        other => Err(EditError::invalid_param(
            name,
            format!("expected a boolean, got {}", other),
        )),
    }
}

/// `true`/`null` → default sigma, number or `{"sigma": n}` → that sigma,
/// `false` → disabled.
fn sigma(name: &str, params: &Value, default: f32) -> Result<Option<f32>, EditError> {
    let value = match params {
        Value::Null | Value::Bool(true) => return Ok(Some(default)),
        Value::Bool(false) => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("sigma").and_then(Value::as_f64),
        _ => None,
    };

    match value {
        Some(sigma) if (0.3..=1000.0).contains(&sigma) => Ok(Some(sigma as f32)),
        _ => Err(EditError::invalid_param(
            name,
            format!("sigma must be between 0.3 and 1000, got {}", params),
        )),
    }
}

/// Composite the image over a solid background, leaving it opaque.
fn flatten(image: &DynamicImage, background: Color) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut bg = background.to_rgba();
    bg[3] = 255;
    let mut canvas = RgbaImage::from_pixel(width, height, bg);
    imageops::overlay(&mut canvas, &image.to_rgba8(), 0, 0);
    canvas
}

fn luminance(pixel: &Rgba<u8>) -> f32 {
    0.2126 * pixel[0] as f32 + 0.7152 * pixel[1] as f32 + 0.0722 * pixel[2] as f32
}

/// Recolour by scaling the tint colour with each pixel's luminance.
fn tint(image: &DynamicImage, color: Color) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    for pixel in rgba.pixels_mut() {
        let l = luminance(pixel) / 255.0;
        pixel[0] = (color.r as f32 * l).round() as u8;
        pixel[1] = (color.g as f32 * l).round() as u8;
        pixel[2] = (color.b as f32 * l).round() as u8;
    }
    rgba
}

/// Stretch luminance so the darkest pixel maps to 0 and the brightest to 255.
fn normalize(image: &DynamicImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();

    let (min, max) = rgba
        .pixels()
        .map(luminance)
        .fold((f32::MAX, f32::MIN), |(lo, hi), l| (lo.min(l), hi.max(l)));

    if max - min < f32::EPSILON {
        return rgba;
    }

    let scale = 255.0 / (max - min);
    for pixel in rgba.pixels_mut() {
        for channel in 0..3 {
            let stretched = (pixel[channel] as f32 - min) * scale;
            pixel[channel] = stretched.round().clamp(0.0, 255.0) as u8;
        }
    }
    rgba
}
