//! Brand watermark for edited images.
//!
//! A watermark is a fixed vector template carrying a brand mark and the
//! caller's name text, rasterized with `resvg` and composited onto the
//! bottom-right corner of the image.
//!
//! # Templates
//!
//! | style    | size    | applied when     |
//! |----------|---------|------------------|
//! | `banner` | 340x64  | width > 340      |
//! | `cute`   | 150x150 | width > 150      |
//!
//! A `banner` request on an image between 151 and 340 pixels wide is
//! skipped without error.

pub mod composer;
pub mod template;

pub use composer::WatermarkComposer;
pub use template::{escape_xml, WatermarkTemplate};
