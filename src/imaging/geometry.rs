//! Pixel geometry shared by the edit resolvers and the image handle.

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
}

impl ImageMetadata {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Rectangle to extract from an image.
///
/// Fields are signed so that rectangles computed from padded bounding boxes
/// can be represented even when they fall outside the image; `fits_within`
/// is the only place that decides whether such a rectangle is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl CropRect {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether the rectangle is non-empty and lies entirely inside `bounds`.
    pub fn fits_within(&self, bounds: ImageMetadata) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.width > 0
            && self.height > 0
            && self
                .left
                .checked_add(self.width)
                .map_or(false, |right| right <= bounds.width as i64)
            && self
                .top
                .checked_add(self.height)
                .map_or(false, |bottom| bottom <= bounds.height as i64)
    }
}
