use crate::{
    assets::bitmap::{Bitmap, FrameAsset},
    foundation::config::FrameFit,
    foundation::core::{Affine, Canvas, Point, PremulRgba8, Rect},
    foundation::error::{FrameIdError, FrameIdResult},
    render::pixel,
};

/// Premultiplied RGBA8 drawing target with canvas-like draw calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
    tainted: bool,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(canvas: Canvas) -> FrameIdResult<Self> {
        Ok(Self {
            canvas,
            data: vec![0u8; canvas.byte_len()?],
            tainted: false,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// Transparent outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        if x >= self.canvas.width || y >= self.canvas.height {
            return [0, 0, 0, 0];
        }
        let idx = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Draw the `src_rect` window of `bitmap` through `transform` (bitmap space to surface
    /// space), optionally clipped to `clip` in surface space.
    ///
    /// A surface pixel is covered when its center maps inside `src_rect`.
    pub fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap,
        src_rect: Rect,
        transform: Affine,
        clip: Option<Rect>,
    ) -> FrameIdResult<()> {
        let src_rect = src_rect.intersect(Rect::new(
            0.0,
            0.0,
            f64::from(bitmap.width()),
            f64::from(bitmap.height()),
        ));
        if src_rect.width() <= 0.0 || src_rect.height() <= 0.0 {
            return Ok(());
        }
        if transform.determinant().abs() < f64::EPSILON {
            return Err(FrameIdError::render("degenerate draw transform"));
        }
        let inv = transform.inverse();

        let mut bounds = transform
            .transform_rect_bbox(src_rect)
            .intersect(self.canvas.rect());
        if let Some(clip) = clip {
            bounds = bounds.intersect(clip);
        }
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Ok(());
        }

        let x_start = bounds.x0.floor().max(0.0) as u32;
        let y_start = bounds.y0.floor().max(0.0) as u32;
        let x_end = (bounds.x1.ceil() as u32).min(self.canvas.width);
        let y_end = (bounds.y1.ceil() as u32).min(self.canvas.height);

        // Sampling window in pixel-index space.
        let win_min = (src_rect.x0.floor() as u32, src_rect.y0.floor() as u32);
        let win_max = (
            (src_rect.x1.ceil() as u32).saturating_sub(1).max(win_min.0),
            (src_rect.y1.ceil() as u32).saturating_sub(1).max(win_min.1),
        );

        let src = bitmap.as_premul_bytes();
        let width = self.canvas.width as usize;
        for y in y_start..y_end {
            for x in x_start..x_end {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if let Some(clip) = clip
                    && !clip.contains(center)
                {
                    continue;
                }
                let s = inv * center;
                if s.x < src_rect.x0 || s.x >= src_rect.x1 || s.y < src_rect.y0 || s.y >= src_rect.y1
                {
                    continue;
                }
                let sampled = pixel::sample_bilinear(
                    src,
                    bitmap.width(),
                    s.x - 0.5,
                    s.y - 0.5,
                    win_min,
                    win_max,
                );
                let idx = ((y as usize) * width + (x as usize)) * 4;
                let dst = [
                    self.data[idx],
                    self.data[idx + 1],
                    self.data[idx + 2],
                    self.data[idx + 3],
                ];
                self.data[idx..idx + 4].copy_from_slice(&pixel::over(dst, sampled));
            }
        }

        self.tainted |= bitmap.is_tainted();
        Ok(())
    }

    /// Composite another surface of the same size on top of this one.
    pub fn draw_surface(&mut self, top: &Surface) -> FrameIdResult<()> {
        if top.canvas != self.canvas {
            return Err(FrameIdError::render("draw_surface expects equal canvases"));
        }
        pixel::over_in_place(&mut self.data, &top.data)?;
        self.tainted |= top.tainted;
        Ok(())
    }
}

/// Where the frame artwork lands on a canvas of size `canvas`.
pub fn frame_placement(frame_width: u32, frame_height: u32, canvas: Canvas, fit: FrameFit) -> Rect {
    match fit {
        FrameFit::Stretch => canvas.rect(),
        FrameFit::Contain => {
            let (fw, fh) = (f64::from(frame_width), f64::from(frame_height));
            let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
            let scale = (cw / fw).min(ch / fh);
            let (w, h) = (fw * scale, fh * scale);
            let x = (cw - w) / 2.0;
            let y = (ch - h) / 2.0;
            Rect::new(x, y, x + w, y + h)
        }
    }
}

/// Frame artwork rasterized once onto a transparent canvas of the output size.
///
/// Shared by photo-slot detection and every redraw of the same frame.
#[derive(Clone, Debug)]
pub struct FrameLayer {
    surface: Surface,
    placed: Rect,
}

impl FrameLayer {
    #[tracing::instrument(skip(frame), fields(fw = frame.bitmap().width(), fh = frame.bitmap().height()))]
    pub fn rasterize(frame: &FrameAsset, canvas: Canvas, fit: FrameFit) -> FrameIdResult<Self> {
        let bitmap = frame.bitmap();
        let placed = frame_placement(bitmap.width(), bitmap.height(), canvas, fit);

        // Snap to whole pixels so the layer is an exact copy when no scaling is needed.
        let x0 = placed.x0.round().max(0.0) as u32;
        let y0 = placed.y0.round().max(0.0) as u32;
        let x1 = (placed.x1.round() as u32).clamp(x0 + 1, canvas.width.max(x0 + 1));
        let y1 = (placed.y1.round() as u32).clamp(y0 + 1, canvas.height.max(y0 + 1));
        let (tw, th) = (x1 - x0, y1 - y0);

        let scaled = if (tw, th) == (bitmap.width(), bitmap.height()) {
            bitmap.to_premul_image()?
        } else {
            image::imageops::resize(
                &bitmap.to_premul_image()?,
                tw,
                th,
                image::imageops::FilterType::Triangle,
            )
        };

        let mut surface = Surface::new(canvas)?;
        let width = canvas.width as usize;
        for (sx, sy, px) in scaled.enumerate_pixels() {
            let (dx, dy) = (x0 + sx, y0 + sy);
            if dx >= canvas.width || dy >= canvas.height {
                continue;
            }
            let idx = ((dy as usize) * width + (dx as usize)) * 4;
            surface.data[idx..idx + 4].copy_from_slice(&px.0);
        }
        surface.tainted = bitmap.is_tainted();

        Ok(Self {
            surface,
            placed: Rect::new(
                f64::from(x0),
                f64::from(y0),
                f64::from(x1.min(canvas.width)),
                f64::from(y1.min(canvas.height)),
            ),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.surface.canvas
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Whole-pixel rectangle covered by the frame artwork.
    pub fn placed(&self) -> Rect {
        self.placed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
