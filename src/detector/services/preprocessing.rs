use image::{imageops, imageops::FilterType, DynamicImage, RgbImage};

use crate::error::DecodeError;

/// Decodes an encoded raster (PNG, JPEG, BMP, ...) into an 8-bit RGB grid.
pub fn decode(bytes: &[u8], limit: usize) -> Result<RgbImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() > limit {
        return Err(DecodeError::TooLarge {
            size: bytes.len(),
            limit,
        });
    }

    let image = image::load_from_memory(bytes)?;
    ensure_dimensions(&image)?;

    Ok(image.to_rgb8())
}

// The bundled decoders already refuse most empty containers; this covers any
// format that hands back a 0-pixel grid anyway.
fn ensure_dimensions(image: &DynamicImage) -> Result<(), DecodeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(DecodeError::ZeroDimensions);
    }
    Ok(())
}

/// Shrinks (or stretches) the grid to exactly `width` x `height`.
///
/// Nearest-neighbour keeps every output pixel an exact copy of a source pixel,
/// so hard color edges never produce blended hues that belong to neither side.
pub fn downsample(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(image, width, height, FilterType::Nearest)
}
