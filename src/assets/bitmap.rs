use std::sync::Arc;

use crate::foundation::core::PremulRgba8;
use crate::foundation::error::{FrameIdError, FrameIdResult};
use crate::render::pixel;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct Bitmap {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
    tainted: bool,
}

impl Bitmap {
    /// Wrap an already premultiplied buffer.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> FrameIdResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameIdError::malformed("image has zero width or height"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FrameIdError::malformed("image size overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(FrameIdError::malformed(format!(
                "expected {expected} bytes of rgba8, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            tainted: false,
        })
    }

    /// Premultiply and wrap a straight-alpha image.
    pub fn from_rgba_image(img: image::RgbaImage) -> FrameIdResult<Self> {
        let (width, height) = img.dimensions();
        let mut raw = img.into_raw();
        pixel::premultiply_in_place(&mut raw);
        Self::from_premul(width, height, raw)
    }

    /// Mark pixels as originating from a cross-origin source without read permission.
    pub fn into_tainted(mut self) -> Self {
        self.tainted = true;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    pub fn as_premul_bytes(&self) -> &[u8] {
        self.rgba8_premul.as_slice()
    }

    /// Pixel at `(x, y)`; out-of-range coordinates are fully transparent.
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.rgba8_premul[idx..idx + 4];
        [px[0], px[1], px[2], px[3]]
    }

    /// Copy of the premultiplied pixels as an `image` buffer (used for resampling).
    pub(crate) fn to_premul_image(&self) -> FrameIdResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8_premul.to_vec())
            .ok_or_else(|| FrameIdError::render("bitmap buffer does not match its dimensions"))
    }
}

/// Frame artwork: the overlay whose transparent slot reveals the user's photo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameAsset(Bitmap);

impl FrameAsset {
    pub fn new(bitmap: Bitmap) -> Self {
        Self(bitmap)
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.0
    }
}

/// Photo uploaded by the user. Replaced wholesale on every new upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPhoto(Bitmap);

impl UserPhoto {
    pub fn new(bitmap: Bitmap) -> Self {
        Self(bitmap)
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.0
    }
}
