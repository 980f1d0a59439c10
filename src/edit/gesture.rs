//! Pointer, touch and wheel input mapped onto [`Transform`] updates.

use crate::edit::transform::Transform;
use crate::foundation::config::EditorConfig;
use crate::foundation::core::{Point, Vec2};

/// One wheel tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelInput {
    /// Negative is "up" (towards the user).
    pub delta_y: f64,
    pub shift: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Pinch {
    distance: f64,
    angle_deg: f64,
}

/// Gesture state for one editing surface.
///
/// Every input method returns the updated transform when the input changed it, `None`
/// otherwise.
#[derive(Clone, Debug)]
pub struct GestureTracker {
    wheel_zoom_in: f64,
    wheel_zoom_out: f64,
    wheel_rotate_step_deg: f64,
    drag_offset: Option<Vec2>,
    pinch: Option<Pinch>,
}

impl GestureTracker {
    pub fn new(cfg: &EditorConfig) -> Self {
        Self {
            wheel_zoom_in: cfg.wheel_zoom_in,
            wheel_zoom_out: cfg.wheel_zoom_out,
            wheel_rotate_step_deg: cfg.wheel_rotate_step_deg,
            drag_offset: None,
            pinch: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Forget any gesture in progress (new photo, pointer left the surface).
    pub fn reset(&mut self) {
        self.drag_offset = None;
        self.pinch = None;
    }

    pub fn pointer_down(&mut self, at: Point, current: &Transform) {
        self.drag_offset = Some(at.to_vec2() - current.translate());
    }

    pub fn pointer_move(&mut self, at: Point, current: &Transform) -> Option<Transform> {
        let offset = self.drag_offset?;
        Some(current.with_translate(at.to_vec2() - offset))
    }

    pub fn pointer_up(&mut self) {
        self.drag_offset = None;
    }

    pub fn wheel(&self, input: WheelInput, current: &Transform) -> Option<Transform> {
        if input.delta_y == 0.0 || !input.delta_y.is_finite() {
            return None;
        }
        let up = input.delta_y < 0.0;
        if input.shift {
            let step = if up {
                self.wheel_rotate_step_deg
            } else {
                -self.wheel_rotate_step_deg
            };
            Some(current.rotate(step))
        } else {
            let factor = if up {
                self.wheel_zoom_in
            } else {
                self.wheel_zoom_out
            };
            Some(current.zoom(factor))
        }
    }

    pub fn touch_start(&mut self, touches: &[Point], current: &Transform) {
        match touches {
            [one] => {
                self.pinch = None;
                self.pointer_down(*one, current);
            }
            [a, b, ..] => {
                self.drag_offset = None;
                self.pinch = Some(pinch_of(*a, *b));
            }
            [] => self.reset(),
        }
    }

    /// One finger drags; two fingers pinch-zoom by the distance ratio and rotate by the angle
    /// change between consecutive events.
    pub fn touch_move(&mut self, touches: &[Point], current: &Transform) -> Option<Transform> {
        match touches {
            [one] => self.pointer_move(*one, current),
            [a, b, ..] => {
                let last = self.pinch?;
                let now = pinch_of(*a, *b);
                self.pinch = Some(now);

                let mut next = *current;
                if last.distance > 0.0 && now.distance > 0.0 {
                    next = next.zoom(now.distance / last.distance);
                }
                next = next.rotate(wrap_degrees(now.angle_deg - last.angle_deg));
                Some(next)
            }
            [] => None,
        }
    }

    pub fn touch_end(&mut self) {
        self.reset();
    }
}

fn pinch_of(a: Point, b: Point) -> Pinch {
    let d = b - a;
    Pinch {
        distance: d.hypot(),
        angle_deg: d.y.atan2(d.x).to_degrees(),
    }
}

/// Map an angle difference into (-180, 180] so crossing the atan2 seam does not spin the photo.
fn wrap_degrees(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

#[cfg(test)]
#[path = "../../tests/unit/edit/gesture.rs"]
mod tests;
