//! Parameter shapes of the specialised edits.
//!
//! Callers build directives from query strings and JSON bodies alike, so
//! numeric fields accept either JSON numbers or numeric strings. Values that
//! do not parse as numbers are treated as absent, matching how ratios and
//! alpha fall back to their defaults when out of range.

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Colour given either as `{r, g, b, alpha?}` (alpha 0.0–1.0) or `#RGB`/`#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        alpha: 1.0,
    };

    pub fn to_rgba(self) -> image::Rgba<u8> {
        let alpha = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([self.r, self.g, self.b, alpha])
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels {
        r: u8,
        g: u8,
        b: u8,
        #[serde(default = "opaque")]
        alpha: f32,
    },
}

fn opaque() -> f32 {
    1.0
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ColorRepr::deserialize(deserializer)? {
            ColorRepr::Hex(hex) => parse_hex_color(&hex).map_err(de::Error::custom),
            ColorRepr::Channels { r, g, b, alpha } => Ok(Color { r, g, b, alpha }),
        }
    }
}

/// Parse `#RGB` or `#RRGGBB` into an opaque colour.
pub fn parse_hex_color(hex: &str) -> Result<Color, String> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| "Color must start with '#'".to_string())?;

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| format!("Invalid hex digit in {}", hex));

    let (r, g, b) = match digits.len() {
        // #RGB - each digit doubled: 0xF -> 0xFF
        3 => (
            channel(&digits[0..1])? * 17,
            channel(&digits[1..2])? * 17,
            channel(&digits[2..3])? * 17,
        ),
        6 => (
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ),
        n => {
            return Err(format!(
                "Color must be #RGB or #RRGGBB format, got {} characters",
                n
            ))
        }
    };

    Ok(Color { r, g, b, alpha: 1.0 })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

/// Number or numeric string; anything unparsable becomes `None`.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value: Option<LenientNumber> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(LenientNumber::Number(n)) => Some(n),
        Some(LenientNumber::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}

/// A `left`/`top` placement: pixel offset, or percentage when suffixed with `p`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PlacementValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlacementOptions {
    #[serde(default)]
    pub left: Option<PlacementValue>,
    #[serde(default)]
    pub top: Option<PlacementValue>,
}

/// Parameters of an `overlayWith` edit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlaySpec {
    #[serde(alias = "storageBucket")]
    pub bucket: String,
    #[serde(alias = "storageKey")]
    pub key: String,
    /// Overlay width as a percentage of the base width
    #[serde(default, rename = "wRatio", alias = "widthRatioPercent", deserialize_with = "lenient_number")]
    pub width_ratio: Option<f64>,
    /// Overlay height as a percentage of the base height
    #[serde(default, rename = "hRatio", alias = "heightRatioPercent", deserialize_with = "lenient_number")]
    pub height_ratio: Option<f64>,
    /// Opacity reduction, 0 = opaque, 100 = invisible
    #[serde(default, alias = "alphaPercent", deserialize_with = "lenient_number")]
    pub alpha: Option<f64>,
    #[serde(default, alias = "placementOptions")]
    pub options: PlacementOptions,
}

/// Sizing and opacity rules shared by overlays and watermark brand marks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlaySizing {
    pub width_ratio: Option<f64>,
    pub height_ratio: Option<f64>,
    pub alpha: Option<f64>,
}

impl OverlaySizing {
    /// Width ratio, only when within 0–100.
    pub fn width_percent(&self) -> Option<f64> {
        self.width_ratio.filter(|r| (0.0..=100.0).contains(r))
    }

    /// Height ratio, only when within 0–100.
    pub fn height_percent(&self) -> Option<f64> {
        self.height_ratio.filter(|r| (0.0..=100.0).contains(r))
    }

    /// Alpha reduction; absent or out of range means fully opaque.
    pub fn alpha_percent(&self) -> f64 {
        self.alpha
            .filter(|a| (0.0..=100.0).contains(a))
            .map(f64::trunc)
            .unwrap_or(0.0)
    }
}

impl OverlaySpec {
    pub fn sizing(&self) -> OverlaySizing {
        OverlaySizing {
            width_ratio: self.width_ratio,
            height_ratio: self.height_ratio,
            alpha: self.alpha,
        }
    }
}

/// Parameters of a `smartCrop` edit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartCropOptions {
    #[serde(default)]
    pub face_index: Option<usize>,
    /// Pixels added on every side of the face box
    #[serde(default, deserialize_with = "lenient_number")]
    pub padding: Option<f64>,
}

impl SmartCropOptions {
    pub fn face_index(&self) -> usize {
        self.face_index.unwrap_or(0)
    }

    pub fn padding(&self) -> f64 {
        self.padding.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkStyle {
    /// Square 150px template
    Cute,
    /// Wide 340px template
    #[default]
    #[serde(other)]
    Banner,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatermarkOptions {
    pub name: String,
    #[serde(default)]
    pub style: WatermarkStyle,
}

/// Parameters of a `TEPWatermark` edit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatermarkSpec {
    #[serde(default, alias = "storageBucket")]
    pub bucket: Option<String>,
    #[serde(default, alias = "storageKey")]
    pub key: Option<String>,
    #[serde(default, rename = "wRatio", alias = "widthRatioPercent", deserialize_with = "lenient_number")]
    pub width_ratio: Option<f64>,
    #[serde(default, rename = "hRatio", alias = "heightRatioPercent", deserialize_with = "lenient_number")]
    pub height_ratio: Option<f64>,
    #[serde(default, alias = "alphaPercent", deserialize_with = "lenient_number")]
    pub alpha: Option<f64>,
    pub options: WatermarkOptions,
}

impl WatermarkSpec {
    pub fn sizing(&self) -> OverlaySizing {
        OverlaySizing {
            width_ratio: self.width_ratio,
            height_ratio: self.height_ratio,
            alpha: self.alpha,
        }
    }

    /// Storage location of a custom brand mark, when both parts are given.
    pub fn brand_location(&self) -> Option<(&str, &str)> {
        match (&self.bucket, &self.key) {
            (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => {
                Some((bucket.as_str(), key.as_str()))
            }
            _ => None,
        }
    }
}
