//! Geometry math for resizing and rotating components.

use kurbo::{Point, Vec2};

use crate::component::Geometry;
use crate::geometry::{
    ROTATION_SNAP_DEGREES, angle_from, normalize_degrees, rotate_point, rotate_vec, snap_degrees,
};
use crate::handles::HandleKind;

/// Smallest width/height a resize can produce, in world units.
pub const MIN_RESIZE_SIZE: f64 = 10.0;

/// Resize `original` by dragging `handle` from `start` to `current` (world).
///
/// Both pointer positions are rotated into the component's unrotated frame,
/// the dragged edges are moved there, and the new center is rotated back, so
/// the edges opposite the handle stay fixed in world space. With
/// `keep_aspect` a corner drag preserves the original aspect ratio.
pub fn resize_geometry(
    original: &Geometry,
    handle: HandleKind,
    start: Point,
    current: Point,
    keep_aspect: bool,
) -> Geometry {
    if handle == HandleKind::Rotate {
        return *original;
    }
    let center = original.center();
    let rotation = original.rotation;
    let local_start = rotate_point(start, center, -rotation);
    let local_current = rotate_point(current, center, -rotation);
    let d = local_current - local_start;

    let mut left = original.x;
    let mut top = original.y;
    let mut right = original.x + original.width;
    let mut bottom = original.y + original.height;

    if handle.affects_left() {
        left += d.x;
    }
    if handle.affects_right() {
        right += d.x;
    }
    if handle.affects_top() {
        top += d.y;
    }
    if handle.affects_bottom() {
        bottom += d.y;
    }

    if keep_aspect && handle.is_corner() && original.width > 0.0 && original.height > 0.0 {
        let sx = (right - left) / original.width;
        let sy = (bottom - top) / original.height;
        let s = if sx.abs() > sy.abs() { sx } else { sy };
        let w = original.width * s;
        let h = original.height * s;
        if handle.affects_left() {
            left = right - w;
        } else {
            right = left + w;
        }
        if handle.affects_top() {
            top = bottom - h;
        } else {
            bottom = top + h;
        }
    }

    // Clamp on the dragged side so the opposite edge stays anchored
    let horizontal = handle.affects_left() || handle.affects_right();
    if horizontal && right - left < MIN_RESIZE_SIZE {
        if handle.affects_left() {
            left = right - MIN_RESIZE_SIZE;
        } else {
            right = left + MIN_RESIZE_SIZE;
        }
    }
    let vertical = handle.affects_top() || handle.affects_bottom();
    if vertical && bottom - top < MIN_RESIZE_SIZE {
        if handle.affects_top() {
            top = bottom - MIN_RESIZE_SIZE;
        } else {
            bottom = top + MIN_RESIZE_SIZE;
        }
    }

    let width = right - left;
    let height = bottom - top;
    let local_center = Point::new(left + width / 2.0, top + height / 2.0);
    let new_center = rotate_point(local_center, center, rotation);

    Geometry {
        x: new_center.x - width / 2.0,
        y: new_center.y - height / 2.0,
        width,
        height,
        rotation,
    }
}

/// New rotation (degrees, normalized to `[0, 360)`) after dragging the
/// rotation handle from `start` to `current`. `snap` rounds to 15°.
pub fn rotate_geometry(original: &Geometry, start: Point, current: Point, snap: bool) -> f64 {
    let center = original.center();
    let delta = angle_from(center, current) - angle_from(center, start);
    let mut rotation = original.rotation + delta;
    if snap {
        rotation = snap_degrees(rotation, ROTATION_SNAP_DEGREES);
    }
    normalize_degrees(rotation)
}

/// Geometry of a group member after its group changed from `before` to `after`.
///
/// The member's center keeps its place in the group's frame, its size scales
/// with the group and it turns by the group's rotation delta.
pub fn follow_group(before: &Geometry, after: &Geometry, member: &Geometry) -> Geometry {
    let sx = if before.width > 0.0 { after.width / before.width } else { 1.0 };
    let sy = if before.height > 0.0 { after.height / before.height } else { 1.0 };
    let local = rotate_vec(member.center() - before.center(), -before.rotation);
    let scaled = Vec2::new(local.x * sx, local.y * sy);
    let center = after.center() + rotate_vec(scaled, after.rotation);
    let width = member.width * sx;
    let height = member.height * sy;
    Geometry {
        x: center.x - width / 2.0,
        y: center.y - height / 2.0,
        width,
        height,
        rotation: normalize_degrees(member.rotation + after.rotation - before.rotation),
    }
}
