//! Watermark rendering and placement.

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use std::sync::Arc;
use tracing::debug;
use usvg::fontdb;

use super::template::WatermarkTemplate;
use crate::edits::{OverlaySizing, WatermarkSpec, WatermarkStyle};
use crate::error::EditError;
use crate::imaging::{EncoderFactory, EncoderQuality, ImageMetadata, Layer, OutputFormat};
use crate::overlay::{prepare_overlay, reduce_alpha, OverlayFetcher};

/// Renders watermark templates. Holds the font database so system fonts are
/// scanned once, not per request.
#[derive(Clone)]
pub struct WatermarkComposer {
    fontdb: Arc<fontdb::Database>,
}

impl WatermarkComposer {
    /// Create a composer with the system fonts loaded.
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "Loaded watermark fonts");
        Self::with_fontdb(Arc::new(db))
    }

    pub fn with_fontdb(fontdb: Arc<fontdb::Database>) -> Self {
        Self { fontdb }
    }

    /// Whether an image of `width` pixels is wide enough for the watermark.
    pub fn should_apply(width: u32, style: WatermarkStyle) -> bool {
        width > 340 || (width > 150 && style == WatermarkStyle::Cute)
    }

    /// Rasterize the template for `style` at its native size.
    pub fn render(
        &self,
        style: WatermarkStyle,
        name: &str,
        brand_png: Option<&[u8]>,
    ) -> Result<RgbaImage, EditError> {
        let template = WatermarkTemplate::for_style(style);
        let markup = template.render(name, brand_png);

        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&markup, &opts)
            .map_err(|e| EditError::Watermark(format!("failed to parse template: {e}")))?;

        let mut pixmap = Pixmap::new(template.width, template.height)
            .ok_or_else(|| EditError::Watermark("failed to allocate pixmap".to_string()))?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let data: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        RgbaImage::from_raw(template.width, template.height, data)
            .ok_or_else(|| EditError::Watermark("failed to create watermark buffer".to_string()))
    }

    /// Build the watermark layer for a base image of size `base`, anchored
    /// to its bottom-right corner. Returns `None` when the image is too
    /// narrow for the requested style.
    pub async fn build_layer(
        &self,
        fetcher: &dyn OverlayFetcher,
        spec: &WatermarkSpec,
        base: ImageMetadata,
        max_pixels: u64,
    ) -> Result<Option<Layer>, EditError> {
        let style = spec.options.style;
        if !Self::should_apply(base.width, style) {
            debug!(width = base.width, style = ?style, "Image too narrow, skipping watermark");
            return Ok(None);
        }

        let brand = match spec.brand_location() {
            Some((bucket, key)) => {
                let data = fetcher.get(bucket, key).await?;
                // alpha is applied to the whole watermark below
                let sizing = OverlaySizing {
                    alpha: None,
                    ..spec.sizing()
                };
                let mark = prepare_overlay(&data, sizing, base, max_pixels)?;
                let encoded = EncoderFactory::create(OutputFormat::Png).encode(
                    mark.as_raw(),
                    mark.width(),
                    mark.height(),
                    EncoderQuality::default(),
                )?;
                Some(encoded.data)
            }
            None => None,
        };

        let mut rendered = self.render(style, &spec.options.name, brand.as_deref())?;
        reduce_alpha(&mut rendered, spec.sizing().alpha_percent());

        let left = base.width as i64 - rendered.width() as i64;
        let top = base.height as i64 - rendered.height() as i64;

        debug!(style = ?style, left = left, top = top, "Resolved watermark placement");
        Ok(Some(Layer::new(rendered, left, top)))
    }
}

impl Default for WatermarkComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WatermarkComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkComposer")
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}
