//! Edit directives
//!
//! Parses the caller's ordered edit mapping into typed directives and holds
//! the parameter shapes and fit arithmetic those directives rely on.

pub mod directive;
pub mod options;
pub mod resize;

pub use directive::{EditDirective, EditSet};
pub use options::{
    parse_hex_color, Color, OverlaySizing, OverlaySpec, PlacementOptions, PlacementValue,
    SmartCropOptions, WatermarkOptions, WatermarkSpec, WatermarkStyle,
};
pub use resize::{FitMode, ResizeOptions, ResizePlan};
