//! Edit directive parsing
//!
//! Callers send edits as an ordered JSON object whose keys name the edit:
//!
//! ```text
//! {"resize": {"width": 400}, "overlayWith": {...}, "grayscale": true}
//! ```
//!
//! Known edits become typed variants; every other key is kept as a named
//! operation and validated against the image handle's supported set when it
//! is applied.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::options::{OverlaySpec, SmartCropOptions, WatermarkSpec};
use super::resize::ResizeOptions;
use crate::error::EditError;

pub const RESIZE: &str = "resize";
pub const ROTATE: &str = "rotate";
pub const OVERLAY: &str = "overlayWith";
pub const SMART_CROP: &str = "smartCrop";
pub const WATERMARK: &str = "TEPWatermark";

/// One edit with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum EditDirective {
    Resize(ResizeOptions),
    /// Rotation in degrees; `None` auto-orients from EXIF.
    Rotate(Option<i64>),
    Overlay(OverlaySpec),
    SmartCrop(SmartCropOptions),
    Watermark(WatermarkSpec),
    /// Any other named operation, forwarded to the image handle.
    Operation { name: String, params: Value },
}

impl EditDirective {
    /// Build a directive from its JSON key and value.
    pub fn parse(name: &str, params: &Value) -> Result<Self, EditError> {
        match name {
            RESIZE => parse_params(name, params).map(EditDirective::Resize),
            ROTATE => parse_rotate(params).map(EditDirective::Rotate),
            OVERLAY => parse_params(name, params).map(EditDirective::Overlay),
            SMART_CROP => match params {
                Value::Null | Value::Bool(true) => {
                    Ok(EditDirective::SmartCrop(SmartCropOptions::default()))
                }
                _ => parse_params(name, params).map(EditDirective::SmartCrop),
            },
            WATERMARK => parse_params(name, params).map(EditDirective::Watermark),
            _ => Ok(EditDirective::Operation {
                name: name.to_string(),
                params: params.clone(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EditDirective::Resize(_) => RESIZE,
            EditDirective::Rotate(_) => ROTATE,
            EditDirective::Overlay(_) => OVERLAY,
            EditDirective::SmartCrop(_) => SMART_CROP,
            EditDirective::Watermark(_) => WATERMARK,
            EditDirective::Operation { name, .. } => name,
        }
    }
}

fn parse_params<T: for<'de> Deserialize<'de>>(name: &str, params: &Value) -> Result<T, EditError> {
    T::deserialize(params).map_err(|e| EditError::invalid_param(name, e.to_string()))
}

fn parse_rotate(params: &Value) -> Result<Option<i64>, EditError> {
    match params {
        Value::Null | Value::Bool(true) => Ok(None),
        Value::Bool(false) => Ok(Some(0)),
        Value::Number(n) => match n.as_f64() {
            Some(angle) if angle.fract() == 0.0 => Ok(Some(angle as i64)),
            _ => Err(EditError::invalid_param(
                ROTATE,
                format!("angle must be a whole number of degrees, got {}", n),
            )),
        },
        other => Err(EditError::invalid_param(
            ROTATE,
            format!("expected a number or null, got {}", other),
        )),
    }
}

/// Ordered, immutable list of edits for one request.
///
/// A `fit: inside` resize is prepended at construction when the caller did
/// not ask for a resize, so every pipeline run has exactly one resize step.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSet {
    directives: Vec<EditDirective>,
    default_resize: bool,
}

impl EditSet {
    pub fn new(mut directives: Vec<EditDirective>) -> Self {
        let has_resize = directives
            .iter()
            .any(|d| matches!(d, EditDirective::Resize(_)));

        if !has_resize {
            directives.insert(0, EditDirective::Resize(ResizeOptions::fit_inside()));
        }

        Self {
            directives,
            default_resize: !has_resize,
        }
    }

    /// Parse an ordered JSON object of edits, keeping the caller's key order.
    pub fn from_json(value: &Value) -> Result<Self, EditError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(EditError::invalid_param(
                "edits",
                format!("expected an object, got {}", other),
            )),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, EditError> {
        let directives = map
            .iter()
            .map(|(name, params)| EditDirective::parse(name, params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(directives))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditDirective> {
        self.directives.iter()
    }

    pub fn directives(&self) -> &[EditDirective] {
        &self.directives
    }

    /// The resize directive (explicit or injected).
    pub fn resize(&self) -> Option<&ResizeOptions> {
        self.directives.iter().find_map(|d| match d {
            EditDirective::Resize(options) => Some(options),
            _ => None,
        })
    }

    /// True when the caller requested no edits at all.
    pub fn is_empty(&self) -> bool {
        self.requested_len() == 0
    }

    /// Number of edits the caller asked for, excluding the injected resize.
    pub fn requested_len(&self) -> usize {
        self.directives.len() - usize::from(self.default_resize)
    }

    pub fn has_default_resize(&self) -> bool {
        self.default_resize
    }
}

impl<'a> IntoIterator for &'a EditSet {
    type Item = &'a EditDirective;
    type IntoIter = std::slice::Iter<'a, EditDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.iter()
    }
}

impl<'de> Deserialize<'de> for EditSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        EditSet::from_map(&map).map_err(de::Error::custom)
    }
}
