use std::io::Cursor;

use anyhow::Context;

use crate::{
    assets::bitmap::UserPhoto,
    assets::source,
    edit::transform::Transform,
    foundation::core::{Affine, Canvas, PhotoArea, Rect},
    foundation::error::{FrameIdError, FrameIdResult},
    render::{
        pixel,
        surface::{FrameLayer, Surface},
    },
};

/// Region of the user photo (photo pixel space) shown in cropper-guided mode.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> FrameIdResult<Self> {
        if !(width > 0.0 && height > 0.0) || !x.is_finite() || !y.is_finite() {
            return Err(FrameIdError::validation(
                "crop needs a finite origin and positive size",
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Largest centered crop of a `photo_width`x`photo_height` photo with the given aspect
    /// ratio (width / height).
    pub fn cover(photo_width: u32, photo_height: u32, aspect: f64) -> FrameIdResult<Self> {
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(FrameIdError::validation("crop aspect must be > 0"));
        }
        let (pw, ph) = (f64::from(photo_width), f64::from(photo_height));
        let (w, h) = if pw / ph > aspect {
            (ph * aspect, ph)
        } else {
            (pw, pw / aspect)
        };
        Self::new((pw - w) / 2.0, (ph - h) / 2.0, w, h)
    }

    /// Intersection with the photo bounds.
    pub fn clamped_to(self, photo_width: u32, photo_height: u32) -> FrameIdResult<Self> {
        let r = self
            .to_rect()
            .intersect(Rect::new(0.0, 0.0, f64::from(photo_width), f64::from(photo_height)));
        Self::new(r.x0, r.y0, r.width(), r.height())
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// How the photo is put on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Placement {
    /// Pan/zoom/rotate placement at raw transform coordinates.
    Freehand { transform: Transform },
    /// Crop stretched into the photo area.
    Cropped { crop: CropRect },
}

/// Rendered output in straight (non-premultiplied) RGBA8, like a canvas readback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeResult {
    canvas: Canvas,
    rgba8: Vec<u8>,
    tainted: bool,
}

impl CompositeResult {
    fn from_surface(surface: Surface) -> Self {
        let canvas = surface.canvas();
        let tainted = surface.is_tainted();
        let mut rgba8 = surface.into_data();
        pixel::unpremultiply_in_place(&mut rgba8);
        Self {
            canvas,
            rgba8,
            tainted,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    pub fn as_rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    /// Straight RGBA at `(x, y)`; transparent outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.canvas.width || y >= self.canvas.height {
            return [0, 0, 0, 0];
        }
        let idx = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        [
            self.rgba8[idx],
            self.rgba8[idx + 1],
            self.rgba8[idx + 2],
            self.rgba8[idx + 3],
        ]
    }

    pub fn to_rgba_image(&self) -> FrameIdResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.canvas.width, self.canvas.height, self.rgba8.clone())
            .ok_or_else(|| FrameIdError::render("composite buffer does not match its canvas"))
    }

    /// Lossless PNG encoding. Refused for tainted composites.
    pub fn encode_png(&self) -> FrameIdResult<Vec<u8>> {
        if self.tainted {
            return Err(FrameIdError::CanvasTainted);
        }
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(self.to_rgba_image()?)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode composite as png")?;
        Ok(buf)
    }

    pub fn to_data_url(&self) -> FrameIdResult<String> {
        Ok(source::png_data_url(&self.encode_png()?))
    }
}

/// Render one output image.
///
/// Fixed draw order: clear, photo, frame. The frame's opaque artwork therefore always hides
/// photo overflow while its transparent slot reveals the photo. Pure function of its inputs.
#[tracing::instrument(skip_all, fields(w = layer.canvas().width, h = layer.canvas().height))]
pub fn compose(
    layer: &FrameLayer,
    photo: Option<(&UserPhoto, &Placement)>,
    area: PhotoArea,
) -> FrameIdResult<CompositeResult> {
    let mut surface = Surface::new(layer.canvas())?;

    if let Some((photo, placement)) = photo {
        let bmp = photo.bitmap();
        let full = Rect::new(0.0, 0.0, f64::from(bmp.width()), f64::from(bmp.height()));
        match placement {
            Placement::Freehand { transform } => {
                let xf = transform.to_affine(bmp.width(), bmp.height());
                surface.draw_bitmap(bmp, full, xf, None)?;
            }
            Placement::Cropped { crop } => {
                let crop = crop.clamped_to(bmp.width(), bmp.height())?;
                let dst = area.to_rect();
                let xf = Affine::translate((dst.x0, dst.y0))
                    * Affine::scale_non_uniform(dst.width() / crop.width, dst.height() / crop.height)
                    * Affine::translate((-crop.x, -crop.y));
                surface.draw_bitmap(bmp, crop.to_rect(), xf, Some(dst))?;
            }
        }
    }

    surface.draw_surface(layer.surface())?;
    tracing::debug!(tainted = surface.is_tainted(), "composited");
    Ok(CompositeResult::from_surface(surface))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
