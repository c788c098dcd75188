//! Overlay compositing support
//!
//! Fetches overlay images from storage, sizes them relative to the base
//! image, reduces their opacity and resolves where they land.

pub mod fetcher;
pub mod placement;
pub mod prepare;

pub use fetcher::{OverlayFetcher, S3OverlayFetcher};
pub use placement::{resolve_offset, resolve_position};
pub use prepare::{build_overlay_layer, overlay_resize, prepare_overlay, reduce_alpha};
