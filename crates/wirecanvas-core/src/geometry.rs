//! Angle and rotation helpers shared by hit-testing, manipulation and rendering.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::handles::HandleKind;

/// Rotation snap increment in degrees (applied while shift is held).
pub const ROTATION_SNAP_DEGREES: f64 = 15.0;

/// Rotate `point` about `center` by `degrees`.
///
/// Canvas space is y-down, so positive angles turn clockwise on screen.
pub fn rotate_point(point: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Rotate a vector by `degrees`.
pub fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Normalize an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Snap an angle to the nearest multiple of `step`.
pub fn snap_degrees(degrees: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return degrees;
    }
    (degrees / step).round() * step
}

/// Angle of the vector from `center` to `point`, in degrees.
pub fn angle_from(center: Point, point: Point) -> f64 {
    let d = point - center;
    d.y.atan2(d.x).to_degrees()
}

/// Cursor the host should show for the current pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CursorHint {
    #[default]
    Default,
    Crosshair,
    Move,
    Grab,
    Grabbing,
    NsResize,
    EwResize,
    NeswResize,
    NwseResize,
}

impl CursorHint {
    /// CSS cursor keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            CursorHint::Default => "default",
            CursorHint::Crosshair => "crosshair",
            CursorHint::Move => "move",
            CursorHint::Grab => "grab",
            CursorHint::Grabbing => "grabbing",
            CursorHint::NsResize => "ns-resize",
            CursorHint::EwResize => "ew-resize",
            CursorHint::NeswResize => "nesw-resize",
            CursorHint::NwseResize => "nwse-resize",
        }
    }
}

/// Resize cursor for a handle on a component rotated by `rotation` degrees.
///
/// The handle's compass direction is turned by the rotation and rounded to the
/// nearest octant, so a top handle on a component rotated 90° shows `ew-resize`.
pub fn cursor_for_handle(handle: HandleKind, rotation: f64) -> CursorHint {
    let Some(base) = handle.compass_degrees() else {
        return CursorHint::Grab;
    };
    let angle = normalize_degrees(base + rotation);
    let octant = ((angle / 45.0).round() as i64).rem_euclid(8);
    match octant {
        0 | 4 => CursorHint::NsResize,
        1 | 5 => CursorHint::NeswResize,
        2 | 6 => CursorHint::EwResize,
        _ => CursorHint::NwseResize,
    }
}
