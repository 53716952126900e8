//! Drawing surface lifecycle: mounting, resizing and repaint requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kurbo::{Point, Size};

/// Placement of a mounted surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Top-left of the surface in client coordinates.
    pub origin: Point,
    /// Size of the container's content box in logical pixels.
    pub size: Size,
    /// Device pixels per logical pixel.
    pub scale_factor: f64,
}

impl SurfaceMetrics {
    /// Backing store dimensions in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let w = (self.size.width * self.scale_factor).round().max(0.0);
        let h = (self.size.height * self.scale_factor).round().max(0.0);
        (w as u32, h as u32)
    }
}

/// Shared flag used to ask the host for a new frame.
///
/// Cloned into async completions (such as image loads) so they can request a
/// repaint without holding the surface.
#[derive(Debug, Clone, Default)]
pub struct RepaintHandle(Arc<AtomicBool>);

impl RepaintHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns and clears the pending request.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The canvas element as seen by the engine.
#[derive(Debug, Clone, Default)]
pub struct CanvasSurface {
    metrics: Option<SurfaceMetrics>,
    repaint: RepaintHandle,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the surface to its container.
    pub fn mount(&mut self, origin: Point, container: Size, scale_factor: f64) {
        let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        self.metrics = Some(SurfaceMetrics {
            origin,
            size: clamp_size(container),
            scale_factor,
        });
        log::debug!("Surface mounted at {origin:?}, {container:?} @{scale_factor}x");
        self.repaint.request();
    }

    pub fn unmount(&mut self) {
        self.metrics = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn metrics(&self) -> Option<&SurfaceMetrics> {
        self.metrics.as_ref()
    }

    /// Container size changed. Updates the pixel dimensions and requests a
    /// repaint. Returns whether anything changed.
    pub fn resize(&mut self, container: Size) -> bool {
        let Some(metrics) = self.metrics.as_mut() else {
            return false;
        };
        let size = clamp_size(container);
        if metrics.size == size {
            return false;
        }
        metrics.size = size;
        log::trace!("Surface resized to {size:?}");
        self.repaint.request();
        true
    }

    /// The surface moved within the page (scroll or layout shift).
    pub fn set_origin(&mut self, origin: Point) {
        if let Some(metrics) = self.metrics.as_mut() {
            metrics.origin = origin;
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor <= 0.0 {
            return;
        }
        if let Some(metrics) = self.metrics.as_mut() {
            if metrics.scale_factor != scale_factor {
                metrics.scale_factor = scale_factor;
                self.repaint.request();
            }
        }
    }

    /// Convert a client-space point to surface-relative canvas coordinates.
    /// Returns the origin when the surface is not mounted.
    pub fn screen_to_canvas(&self, client: Point) -> Point {
        match &self.metrics {
            Some(m) => Point::new(client.x - m.origin.x, client.y - m.origin.y),
            None => Point::ZERO,
        }
    }

    /// Logical size, zero when unmounted.
    pub fn size(&self) -> Size {
        self.metrics.map(|m| m.size).unwrap_or(Size::ZERO)
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.metrics.map(|m| m.pixel_size()).unwrap_or((0, 0))
    }

    pub fn scale_factor(&self) -> f64 {
        self.metrics.map(|m| m.scale_factor).unwrap_or(1.0)
    }

    pub fn request_repaint(&self) {
        self.repaint.request();
    }

    pub fn take_repaint_request(&self) -> bool {
        self.repaint.take()
    }

    pub fn repaint_handle(&self) -> RepaintHandle {
        self.repaint.clone()
    }
}

fn clamp_size(size: Size) -> Size {
    Size::new(size.width.max(0.0), size.height.max(0.0))
}
