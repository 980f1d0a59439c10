//! Photo-slot detection by alpha scanning.

use crate::{
    foundation::config::FallbackArea,
    foundation::core::{Canvas, PhotoArea},
    foundation::error::FrameIdResult,
    render::surface::FrameLayer,
};

/// How a [`PhotoArea`] was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaSource {
    /// Bounding box of the frame's see-through pixels.
    Transparency,
    /// The frame is opaque; the fixed proportional rectangle was used.
    Fallback,
}

/// Detected area plus diagnostics about the scan.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectionReport {
    pub area: PhotoArea,
    pub source: AreaSource,
    /// Pixels with alpha below the threshold.
    pub qualifying_pixels: u64,
    /// `qualifying_pixels / area size`. Well below 1.0 usually means several disjoint
    /// transparent regions were merged into one box.
    pub fill_ratio: f64,
}

/// The fixed proportional rectangle for an opaque frame.
pub fn fallback_area(canvas: Canvas, fractions: FallbackArea) -> FrameIdResult<PhotoArea> {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    PhotoArea::new(
        w * fractions.x,
        h * fractions.y,
        w * fractions.width,
        h * fractions.height,
    )
}

/// Scan the rasterized frame and return the box around every pixel with
/// `alpha < threshold`.
///
/// Only the pixels covered by the frame artwork are scanned, so letterbox bars never count as
/// transparent. All qualifying pixels are merged into a single box regardless of connectivity.
#[tracing::instrument(skip(layer, fallback), fields(w = layer.canvas().width, h = layer.canvas().height))]
pub fn detect_photo_area_report(
    layer: &FrameLayer,
    threshold: u8,
    fallback: FallbackArea,
) -> FrameIdResult<DetectionReport> {
    let canvas = layer.canvas();
    let placed = layer.placed();
    let data = layer.surface().data();

    let (x_start, y_start) = (placed.x0 as u32, placed.y0 as u32);
    let (x_end, y_end) = (placed.x1 as u32, placed.y1 as u32);

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut count = 0u64;

    let width = canvas.width as usize;
    for y in y_start..y_end {
        let row = (y as usize) * width;
        for x in x_start..x_end {
            let alpha = data[(row + x as usize) * 4 + 3];
            if alpha < threshold {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                count += 1;
            }
        }
    }

    if count == 0 {
        tracing::warn!(
            threshold,
            "no transparent pixels in frame, using fallback photo area"
        );
        return Ok(DetectionReport {
            area: fallback_area(canvas, fallback)?,
            source: AreaSource::Fallback,
            qualifying_pixels: 0,
            fill_ratio: 0.0,
        });
    }

    let w = max_x - min_x + 1;
    let h = max_y - min_y + 1;
    let area = PhotoArea::new(
        f64::from(min_x),
        f64::from(min_y),
        f64::from(w),
        f64::from(h),
    )?;
    let fill_ratio = count as f64 / (u64::from(w) * u64::from(h)) as f64;
    if fill_ratio < 0.5 {
        tracing::debug!(
            fill_ratio,
            "transparent pixels are sparse inside the photo box; frame may have several slots"
        );
    }

    Ok(DetectionReport {
        area,
        source: AreaSource::Transparency,
        qualifying_pixels: count,
        fill_ratio,
    })
}

/// [`detect_photo_area_report`] without the diagnostics.
pub fn detect_photo_area(
    layer: &FrameLayer,
    threshold: u8,
    fallback: FallbackArea,
) -> FrameIdResult<PhotoArea> {
    Ok(detect_photo_area_report(layer, threshold, fallback)?.area)
}

#[cfg(test)]
#[path = "../../tests/unit/render/detect.rs"]
mod tests;
