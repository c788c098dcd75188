//! Layer compositing.
//!
//! Blends RGBA layers onto a base image at signed pixel offsets using the
//! Porter-Duff "over" operator. Parts of a layer that fall outside the
//! base are clipped.

use image::{Rgba, RgbaImage};

/// An image to be composited onto the base at `(left, top)`.
#[derive(Clone)]
pub struct Layer {
    pub image: RgbaImage,
    pub left: i64,
    pub top: i64,
    /// Extra opacity multiplier (0.0 to 1.0) on top of the layer's own alpha.
    pub opacity: f32,
}

impl Layer {
    pub fn new(image: RgbaImage, left: i64, top: i64) -> Self {
        Self {
            image,
            left,
            top,
            opacity: 1.0,
        }
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("left", &self.left)
            .field("top", &self.top)
            .field("opacity", &self.opacity)
            .finish()
    }
}

/// Ordered set of layers applied in one pass.
#[derive(Debug, Default)]
pub struct Compositor {
    layers: Vec<Layer>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Apply all layers in the order they were added.
    pub fn apply(&self, target: &mut RgbaImage) {
        for layer in &self.layers {
            blend_layer(target, layer);
        }
    }
}

fn blend_layer(target: &mut RgbaImage, layer: &Layer) {
    let target_width = target.width() as i64;
    let target_height = target.height() as i64;

    let x_start = layer.left.max(0);
    let y_start = layer.top.max(0);
    let x_end = layer
        .left
        .saturating_add(layer.image.width() as i64)
        .min(target_width);
    let y_end = layer
        .top
        .saturating_add(layer.image.height() as i64)
        .min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wx = (tx - layer.left) as u32;
            let wy = (ty - layer.top) as u32;

            let fg = *layer.image.get_pixel(wx, wy);
            let bg = *target.get_pixel(tx as u32, ty as u32);
            target.put_pixel(tx as u32, ty as u32, blend_pixels(bg, fg, layer.opacity));
        }
    }
}

/// result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    if fg_alpha <= 0.0 {
        return background;
    }
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
