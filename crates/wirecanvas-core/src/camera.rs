//! Camera module for pan/zoom transforms between canvas and world space.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;
/// Zoom factor applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Camera holds the view transform of the canvas.
///
/// Canvas coordinates are pixels relative to the drawing surface; world
/// coordinates are the document space components live in.
/// `canvas = world * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Translation in canvas pixels.
    pub pan: Vec2,
    /// Scale factor, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// Clamp a zoom value into the allowed range.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

impl Camera {
    /// Create a camera with the given pan and zoom (zoom is clamped).
    pub fn new(pan: Vec2, zoom: f64) -> Self {
        Self {
            pan,
            zoom: clamp_zoom(zoom),
        }
    }

    /// World to canvas transform, used for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Canvas to world transform, used for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a canvas point to world coordinates.
    pub fn canvas_to_world(&self, canvas_point: Point) -> Point {
        Point::new(
            (canvas_point.x - self.pan.x) / self.zoom,
            (canvas_point.y - self.pan.y) / self.zoom,
        )
    }

    /// Convert a world point to canvas coordinates.
    pub fn world_to_canvas(&self, world_point: Point) -> Point {
        Point::new(
            world_point.x * self.zoom + self.pan.x,
            world_point.y * self.zoom + self.pan.y,
        )
    }

    /// The world-space rectangle visible in a viewport of the given size.
    pub fn visible_world_rect(&self, viewport: Size) -> Rect {
        let tl = self.canvas_to_world(Point::ZERO);
        let br = self.canvas_to_world(Point::new(viewport.width, viewport.height));
        Rect::from_points(tl, br)
    }

    /// Pan the camera by a delta in canvas pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    /// Zoom by `factor`, keeping the world point under `canvas_point` fixed.
    pub fn zoom_about(&mut self, canvas_point: Point, factor: f64) {
        let new_zoom = clamp_zoom(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.canvas_to_world(canvas_point);
        self.zoom = new_zoom;

        // Adjust pan so world_point stays under canvas_point
        let moved = self.world_to_canvas(world_point);
        self.pan += canvas_point - moved;
    }
}
