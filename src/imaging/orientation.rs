//! EXIF orientation handling for auto-rotation.

use image::DynamicImage;
use std::io::Cursor;

/// Read the EXIF orientation tag (1 to 8) from encoded image data.
///
/// Returns `None` when the container carries no EXIF block or no
/// orientation tag.
pub fn read_orientation(data: &[u8]) -> Option<u32> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0).filter(|v| (1..=8).contains(v))
}

/// Transform `image` so that it displays upright for the given orientation.
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        // transpose
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        // transverse
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
