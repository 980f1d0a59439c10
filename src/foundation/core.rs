use crate::foundation::error::{FrameIdError, FrameIdResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Pixel size of a raster surface (output canvas, off-screen scan canvas).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> FrameIdResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameIdError::validation("canvas dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Output size for a frame: the long edge becomes `max_edge`, the short edge follows the
    /// frame's aspect ratio.
    pub fn for_frame(frame_width: u32, frame_height: u32, max_edge: u32) -> FrameIdResult<Self> {
        if frame_width == 0 || frame_height == 0 {
            return Err(FrameIdError::validation("frame dimensions must be > 0"));
        }
        if max_edge == 0 {
            return Err(FrameIdError::validation("max output edge must be > 0"));
        }

        let (fw, fh, edge) = (
            f64::from(frame_width),
            f64::from(frame_height),
            f64::from(max_edge),
        );
        let (w, h) = if frame_width > frame_height {
            (edge, edge * fh / fw)
        } else {
            (edge * fw / fh, edge)
        };
        Self::new((w.round() as u32).max(1), (h.round() as u32).max(1))
    }

    pub fn size(self) -> Vec2 {
        Vec2::new(f64::from(self.width), f64::from(self.height))
    }

    pub fn center(self) -> Point {
        (self.size() / 2.0).to_point()
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    pub(crate) fn byte_len(self) -> FrameIdResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FrameIdError::render("canvas buffer size overflow"))
    }
}

/// Region of the output canvas that receives the user's photo.
///
/// Always expressed in output-canvas pixel space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhotoArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PhotoArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> FrameIdResult<Self> {
        if !(width > 0.0 && height > 0.0) || !x.is_finite() || !y.is_finite() {
            return Err(FrameIdError::validation(
                "photo area needs a finite origin and positive size",
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(self) -> Point {
        self.to_rect().center()
    }

    pub fn aspect(self) -> f64 {
        self.width / self.height
    }

    /// `true` when the area lies entirely inside `canvas`.
    pub fn is_within(self, canvas: Canvas) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= f64::from(canvas.width)
            && self.y + self.height <= f64::from(canvas.height)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
pub type PremulRgba8 = [u8; 4];

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
