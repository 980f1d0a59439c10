use crate::foundation::core::{Affine, Canvas, PhotoArea, Vec2};

/// Smallest allowed zoom, relative to the fitted size.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed zoom, relative to the fitted size.
pub const MAX_SCALE: f64 = 10.0;

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

fn default_base_scale() -> f64 {
    1.0
}

#[derive(serde::Deserialize)]
struct RawTransform {
    translate: Vec2,
    #[serde(default = "default_base_scale")]
    base_scale: f64,
    scale: f64,
    rotation_deg: f64,
}

impl From<RawTransform> for Transform {
    fn from(raw: RawTransform) -> Self {
        Self::new(raw.translate, raw.scale, raw.rotation_deg).with_base_scale(raw.base_scale)
    }
}

/// Placement of the user photo in freehand mode.
///
/// `translate` is where the photo's center sits on the canvas; rotation turns the photo around
/// that center. The photo is drawn at `base_scale * scale`: `base_scale` is the size chosen by
/// [`Transform::fit`] and `scale` is the user's zoom on top of it, always within
/// `[MIN_SCALE, MAX_SCALE]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawTransform")]
pub struct Transform {
    translate: Vec2,
    base_scale: f64,
    scale: f64,
    rotation_deg: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            base_scale: 1.0,
            scale: 1.0,
            rotation_deg: 0.0,
        }
    }
}

impl Transform {
    pub fn new(translate: Vec2, scale: f64, rotation_deg: f64) -> Self {
        let translate = if translate.is_finite() {
            translate
        } else {
            Vec2::ZERO
        };
        let rotation_deg = if rotation_deg.is_finite() {
            rotation_deg
        } else {
            0.0
        };
        Self {
            translate,
            base_scale: 1.0,
            scale: clamp_scale(scale),
            rotation_deg,
        }
    }

    /// Initial placement for a freshly loaded photo: centered on the canvas, rotation 0, zoom 1,
    /// with a base scale that fits the photo exactly inside `area` (or `fallback_fraction` of the
    /// canvas when no frame is known yet) with its aspect ratio preserved.
    pub fn fit(
        photo_width: u32,
        photo_height: u32,
        area: Option<PhotoArea>,
        canvas: Canvas,
        fallback_fraction: f64,
    ) -> Self {
        let (pw, ph) = (
            f64::from(photo_width.max(1)),
            f64::from(photo_height.max(1)),
        );
        let base = match area {
            Some(a) => (a.width / pw).min(a.height / ph),
            None => {
                (f64::from(canvas.width) / pw).min(f64::from(canvas.height) / ph)
                    * fallback_fraction
            }
        };
        Self::new(canvas.center().to_vec2(), 1.0, 0.0).with_base_scale(base)
    }

    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    /// Zoom relative to the base scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    /// Photo pixels to canvas pixels, as drawn.
    pub fn effective_scale(&self) -> f64 {
        self.base_scale * self.scale
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    pub fn with_translate(self, translate: Vec2) -> Self {
        Self::new(translate, self.scale, self.rotation_deg).with_base_scale(self.base_scale)
    }

    pub fn with_scale(self, scale: f64) -> Self {
        Self::new(self.translate, scale, self.rotation_deg).with_base_scale(self.base_scale)
    }

    pub fn with_rotation_deg(self, rotation_deg: f64) -> Self {
        Self::new(self.translate, self.scale, rotation_deg).with_base_scale(self.base_scale)
    }

    /// Replace the base scale. Non-positive or non-finite values fall back to 1.
    pub fn with_base_scale(self, base_scale: f64) -> Self {
        let base_scale = if base_scale.is_finite() && base_scale > 0.0 {
            base_scale
        } else {
            1.0
        };
        Self { base_scale, ..self }
    }

    /// Move by `(dx, dy)`. Unconstrained: the photo may leave the canvas entirely.
    pub fn pan(self, dx: f64, dy: f64) -> Self {
        self.with_translate(self.translate + Vec2::new(dx, dy))
    }

    /// Multiply the zoom by `factor`. Non-positive or non-finite factors are ignored.
    pub fn zoom(self, factor: f64) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            return self;
        }
        self.with_scale(self.scale * factor)
    }

    pub fn rotate(self, delta_deg: f64) -> Self {
        self.with_rotation_deg(self.rotation_deg + delta_deg)
    }

    /// Photo-pixel space to canvas space for a photo of the given size.
    pub fn to_affine(&self, photo_width: u32, photo_height: u32) -> Affine {
        let half = Vec2::new(f64::from(photo_width), f64::from(photo_height)) / 2.0;

        // T(translate) * R(rot) * S(base * zoom) * T(-half)
        Affine::translate(self.translate)
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.effective_scale())
            * Affine::translate(-half)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/transform.rs"]
mod tests;
