//! Resize and rotation handle geometry.
//!
//! Handle sizes are specified in screen pixels and converted to world units by
//! dividing by the zoom, so handles keep a constant on-screen size.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::component::Geometry;
use crate::geometry::rotate_point;

/// Visual handle size for mouse input, in screen pixels.
pub const MOUSE_HANDLE_SIZE: f64 = 8.0;
/// Visual handle size in touch mode, in screen pixels.
pub const TOUCH_HANDLE_SIZE: f64 = 16.0;
/// Distance from the top edge to the rotation handle for mouse input.
pub const MOUSE_ROTATE_OFFSET: f64 = 20.0;
/// Distance from the top edge to the rotation handle in touch mode.
pub const TOUCH_ROTATE_OFFSET: f64 = 30.0;
/// Smallest comfortable touch target, in screen pixels.
pub const MIN_TOUCH_TARGET: f64 = 44.0;

/// The kind of handle, determining the manipulation it performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "t")]
    Top,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "br")]
    BottomRight,
    #[serde(rename = "b")]
    Bottom,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "rotate")]
    Rotate,
}

impl HandleKind {
    /// The eight resize handles, clockwise from the top-left corner.
    pub const RESIZE: [HandleKind; 8] = [
        HandleKind::TopLeft,
        HandleKind::Top,
        HandleKind::TopRight,
        HandleKind::Right,
        HandleKind::BottomRight,
        HandleKind::Bottom,
        HandleKind::BottomLeft,
        HandleKind::Left,
    ];

    pub fn id(self) -> &'static str {
        match self {
            HandleKind::TopLeft => "tl",
            HandleKind::Top => "t",
            HandleKind::TopRight => "tr",
            HandleKind::Right => "r",
            HandleKind::BottomRight => "br",
            HandleKind::Bottom => "b",
            HandleKind::BottomLeft => "bl",
            HandleKind::Left => "l",
            HandleKind::Rotate => "rotate",
        }
    }

    pub fn affects_left(self) -> bool {
        matches!(self, HandleKind::TopLeft | HandleKind::Left | HandleKind::BottomLeft)
    }

    pub fn affects_right(self) -> bool {
        matches!(self, HandleKind::TopRight | HandleKind::Right | HandleKind::BottomRight)
    }

    pub fn affects_top(self) -> bool {
        matches!(self, HandleKind::TopLeft | HandleKind::Top | HandleKind::TopRight)
    }

    pub fn affects_bottom(self) -> bool {
        matches!(self, HandleKind::BottomLeft | HandleKind::Bottom | HandleKind::BottomRight)
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            HandleKind::TopLeft | HandleKind::TopRight | HandleKind::BottomRight | HandleKind::BottomLeft
        )
    }

    /// The handle on the opposite side, which stays fixed during a resize.
    pub fn opposite(self) -> HandleKind {
        match self {
            HandleKind::TopLeft => HandleKind::BottomRight,
            HandleKind::Top => HandleKind::Bottom,
            HandleKind::TopRight => HandleKind::BottomLeft,
            HandleKind::Right => HandleKind::Left,
            HandleKind::BottomRight => HandleKind::TopLeft,
            HandleKind::Bottom => HandleKind::Top,
            HandleKind::BottomLeft => HandleKind::TopRight,
            HandleKind::Left => HandleKind::Right,
            HandleKind::Rotate => HandleKind::Rotate,
        }
    }

    /// Compass direction of the handle from the center (north = 0, clockwise).
    pub fn compass_degrees(self) -> Option<f64> {
        match self {
            HandleKind::Top => Some(0.0),
            HandleKind::TopRight => Some(45.0),
            HandleKind::Right => Some(90.0),
            HandleKind::BottomRight => Some(135.0),
            HandleKind::Bottom => Some(180.0),
            HandleKind::BottomLeft => Some(225.0),
            HandleKind::Left => Some(270.0),
            HandleKind::TopLeft => Some(315.0),
            HandleKind::Rotate => None,
        }
    }

    /// Handle position on an unrotated rectangle.
    fn anchor(self, rect: Rect, rotate_offset: f64) -> Point {
        let cx = (rect.x0 + rect.x1) / 2.0;
        let cy = (rect.y0 + rect.y1) / 2.0;
        match self {
            HandleKind::TopLeft => Point::new(rect.x0, rect.y0),
            HandleKind::Top => Point::new(cx, rect.y0),
            HandleKind::TopRight => Point::new(rect.x1, rect.y0),
            HandleKind::Right => Point::new(rect.x1, cy),
            HandleKind::BottomRight => Point::new(rect.x1, rect.y1),
            HandleKind::Bottom => Point::new(cx, rect.y1),
            HandleKind::BottomLeft => Point::new(rect.x0, rect.y1),
            HandleKind::Left => Point::new(rect.x0, cy),
            HandleKind::Rotate => Point::new(cx, rect.y0 - rotate_offset),
        }
    }
}

/// Handle dimensions in world units for the current zoom and input mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    /// Drawn size of a handle square (and rotation-handle diameter).
    pub size: f64,
    /// Distance from the top edge to the rotation handle.
    pub rotate_offset: f64,
    /// Side of the square (or diameter of the circle) tested for hits.
    pub hit_size: f64,
}

impl HandleMetrics {
    pub fn new(is_touch_mode: bool, zoom: f64) -> Self {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        let (size, rotate_offset, hit_size) = if is_touch_mode {
            (
                TOUCH_HANDLE_SIZE,
                TOUCH_ROTATE_OFFSET,
                MIN_TOUCH_TARGET.max(TOUCH_HANDLE_SIZE * 1.5),
            )
        } else {
            (MOUSE_HANDLE_SIZE, MOUSE_ROTATE_OFFSET, MOUSE_HANDLE_SIZE)
        };
        Self {
            size: size / zoom,
            rotate_offset: rotate_offset / zoom,
            hit_size: hit_size / zoom,
        }
    }
}

/// A positioned handle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
}

impl Handle {
    pub fn new(kind: HandleKind, position: Point) -> Self {
        Self { kind, position }
    }

    /// Hit test with a square for resize handles and a circle for rotation.
    pub fn hit_test(&self, point: Point, metrics: &HandleMetrics) -> bool {
        let half = metrics.hit_size / 2.0;
        let d: Vec2 = point - self.position;
        match self.kind {
            HandleKind::Rotate => d.hypot2() <= half * half,
            _ => d.x.abs() <= half && d.y.abs() <= half,
        }
    }
}

/// All nine handles of a component, rotated about its center.
/// The rotation handle is last.
pub fn component_handles(geometry: &Geometry, metrics: &HandleMetrics) -> Vec<Handle> {
    let rect = geometry.rect();
    let center = geometry.center();
    HandleKind::RESIZE
        .iter()
        .copied()
        .chain(std::iter::once(HandleKind::Rotate))
        .map(|kind| {
            let anchor = kind.anchor(rect, metrics.rotate_offset);
            Handle::new(kind, rotate_point(anchor, center, geometry.rotation))
        })
        .collect()
}

/// Position of a single handle in world coordinates.
pub fn handle_position(geometry: &Geometry, kind: HandleKind, metrics: &HandleMetrics) -> Point {
    let anchor = kind.anchor(geometry.rect(), metrics.rotate_offset);
    rotate_point(anchor, geometry.center(), geometry.rotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(rotation: f64) -> Geometry {
        Geometry {
            rotation,
            ..Geometry::new(0.0, 0.0, 100.0, 50.0)
        }
    }

    #[test]
    fn test_metrics_mouse() {
        let m = HandleMetrics::new(false, 2.0);
        assert!((m.size - 4.0).abs() < f64::EPSILON);
        assert!((m.rotate_offset - 10.0).abs() < f64::EPSILON);
        assert!((m.hit_size - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_touch_enforces_min_target() {
        let m = HandleMetrics::new(true, 1.0);
        assert!((m.size - 16.0).abs() < f64::EPSILON);
        assert!((m.hit_size - 44.0).abs() < f64::EPSILON);
        let zoomed = HandleMetrics::new(true, 4.0);
        assert!((zoomed.hit_size - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_handles_unrotated() {
        let m = HandleMetrics::new(false, 1.0);
        let handles = component_handles(&geometry(0.0), &m);
        assert_eq!(handles.len(), 9);
        assert_eq!(handles[0].kind, HandleKind::TopLeft);
        assert_eq!(handles[4].position, Point::new(100.0, 50.0));
        assert_eq!(handles[8].kind, HandleKind::Rotate);
        assert_eq!(handles[8].position, Point::new(50.0, -20.0));
    }

    #[test]
    fn test_handles_rotated() {
        let m = HandleMetrics::new(false, 1.0);
        let pos = handle_position(&geometry(90.0), HandleKind::Right, &m);
        // Right edge midpoint swings below the center
        assert!((pos.x - 50.0).abs() < 1e-9);
        assert!((pos.y - 75.0).abs() < 1e-9);
        let rot = handle_position(&geometry(90.0), HandleKind::Rotate, &m);
        assert!((rot.x - 95.0).abs() < 1e-9);
        assert!((rot.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_square_and_circle() {
        let m = HandleMetrics::new(false, 1.0);
        let square = Handle::new(HandleKind::BottomRight, Point::new(100.0, 100.0));
        assert!(square.hit_test(Point::new(103.9, 96.1), &m));
        assert!(!square.hit_test(Point::new(104.1, 100.0), &m));

        let circle = Handle::new(HandleKind::Rotate, Point::new(0.0, 0.0));
        assert!(circle.hit_test(Point::new(2.0, 2.0), &m));
        assert!(!circle.hit_test(Point::new(3.5, 3.5), &m));
    }

    #[test]
    fn test_edge_membership() {
        assert!(HandleKind::TopLeft.affects_left() && HandleKind::TopLeft.affects_top());
        assert!(!HandleKind::Top.affects_left() && !HandleKind::Top.affects_right());
        assert_eq!(HandleKind::BottomLeft.opposite(), HandleKind::TopRight);
        assert_eq!(HandleKind::Rotate.id(), "rotate");
    }
}
