use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{FrameIdError, FrameIdResult};

/// How the frame artwork is mapped onto the output canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFit {
    /// Preserve the frame's aspect ratio and center it (letterboxed).
    #[default]
    Contain,
    /// Stretch the frame to the full canvas.
    Stretch,
}

/// Fractions of the canvas used when the frame has no transparent slot.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FallbackArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for FallbackArea {
    fn default() -> Self {
        Self {
            x: 0.1,
            y: 0.2,
            width: 0.8,
            height: 0.6,
        }
    }
}

/// Tunables for one editing session.
///
/// Every field has a default, so a JSON config file only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Upload size limit, enforced on the encoded bytes before decoding.
    pub max_upload_bytes: u64,
    /// Long edge of the rendered output.
    pub max_output_edge: u32,
    /// Pixels with alpha strictly below this value belong to the photo slot.
    pub alpha_threshold: u8,
    pub fallback_area: FallbackArea,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
    pub wheel_rotate_step_deg: f64,
    /// Interactive editing surface used before any frame defines an output size.
    pub editor_canvas: Canvas,
    /// Share of the editor canvas a new photo fills when no frame is loaded.
    pub fit_without_frame: f64,
    pub frame_fit: FrameFit,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 5 * 1024 * 1024,
            max_output_edge: 800,
            alpha_threshold: 200,
            fallback_area: FallbackArea::default(),
            wheel_zoom_in: 1.05,
            wheel_zoom_out: 0.95,
            wheel_rotate_step_deg: 5.0,
            editor_canvas: Canvas {
                width: 500,
                height: 500,
            },
            fit_without_frame: 0.6,
            frame_fit: FrameFit::Contain,
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file and validate it.
    pub fn from_json_file(path: &Path) -> FrameIdResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> FrameIdResult<()> {
        if self.max_upload_bytes == 0 {
            return Err(FrameIdError::validation("max_upload_bytes must be > 0"));
        }
        if self.max_output_edge == 0 {
            return Err(FrameIdError::validation("max_output_edge must be > 0"));
        }
        if self.alpha_threshold == 0 {
            return Err(FrameIdError::validation(
                "alpha_threshold must be > 0 or no pixel can ever qualify",
            ));
        }
        if self.editor_canvas.width == 0 || self.editor_canvas.height == 0 {
            return Err(FrameIdError::validation("editor_canvas must be non-empty"));
        }

        let fb = self.fallback_area;
        let fractions_ok = [fb.x, fb.y, fb.width, fb.height]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
            && fb.width > 0.0
            && fb.height > 0.0
            && fb.x + fb.width <= 1.0
            && fb.y + fb.height <= 1.0;
        if !fractions_ok {
            return Err(FrameIdError::validation(
                "fallback_area must be a non-empty rectangle inside the unit square",
            ));
        }

        for (name, v) in [
            ("wheel_zoom_in", self.wheel_zoom_in),
            ("wheel_zoom_out", self.wheel_zoom_out),
            ("fit_without_frame", self.fit_without_frame),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(FrameIdError::validation(format!("{name} must be > 0")));
            }
        }
        if !self.wheel_rotate_step_deg.is_finite() {
            return Err(FrameIdError::validation(
                "wheel_rotate_step_deg must be finite",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
