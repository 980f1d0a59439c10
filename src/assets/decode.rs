use crate::{
    assets::bitmap::Bitmap,
    foundation::error::{DecodeError, FrameIdResult},
};

/// Raster formats accepted for photos and frames.
pub const SUPPORTED_FORMATS: [image::ImageFormat; 3] = [
    image::ImageFormat::Png,
    image::ImageFormat::Jpeg,
    image::ImageFormat::WebP,
];

/// Reject oversized sources before any decoding work happens.
pub fn check_size(len: u64, limit: u64) -> Result<(), DecodeError> {
    if len > limit {
        return Err(DecodeError::TooLarge { size: len, limit });
    }
    Ok(())
}

/// Sniff the container format from magic bytes.
pub fn sniff_format(bytes: &[u8]) -> Result<image::ImageFormat, DecodeError> {
    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat)?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(DecodeError::UnsupportedFormat);
    }
    Ok(format)
}

/// Decode encoded PNG/JPEG/WEBP bytes into a premultiplied [`Bitmap`].
pub fn decode_bitmap(bytes: &[u8], max_bytes: u64) -> FrameIdResult<Bitmap> {
    check_size(bytes.len() as u64, max_bytes)?;
    let format = sniff_format(bytes)?;

    let dyn_img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let bitmap = Bitmap::from_rgba_image(dyn_img.to_rgba8())?;
    tracing::debug!(
        ?format,
        width = bitmap.width(),
        height = bitmap.height(),
        "decoded bitmap"
    );
    Ok(bitmap)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
