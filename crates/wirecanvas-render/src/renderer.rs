//! Renderer trait abstraction.

use kurbo::{Point, Rect, Size};
use peniko::Color;
use thiserror::Error;
use wirecanvas_core::component::{Component, ComponentId};
use wirecanvas_core::drawing::ShapePreview;
use wirecanvas_core::{Camera, CanvasSurface, DrawingSettings, InteractionEngine, ModelStore, Theme};

/// World-space spacing of the background grid.
pub const GRID_SIZE: f64 = 20.0;

/// Upper bound on grid lines per axis; spacing doubles until it fits.
pub const MAX_GRID_LINES: usize = 400;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No grid, background only.
    None,
    /// Full grid lines.
    #[default]
    Lines,
    /// Only dots at intersections.
    Dots,
}

impl GridStyle {
    /// Cycle to the next grid style.
    pub fn next(self) -> Self {
        match self {
            GridStyle::None => GridStyle::Lines,
            GridStyle::Lines => GridStyle::Dots,
            GridStyle::Dots => GridStyle::None,
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Components in paint order.
    pub components: &'a [Component],
    /// Selection expanded through group membership.
    pub selection: Vec<ComponentId>,
    /// Selected components that are not locked, directly or by their group.
    pub handle_targets: Vec<ComponentId>,
    pub camera: Camera,
    pub theme: &'a Theme,
    pub drawing_settings: DrawingSettings,
    /// Committed pen strokes in world coordinates.
    pub drawn_paths: &'a [Vec<Point>],
    /// Shape being drawn, if any.
    pub preview: Option<&'a ShapePreview>,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Selects touch handle metrics.
    pub touch_mode: bool,
    /// Background color.
    pub background_color: Color,
    /// Grid display style.
    pub grid_style: GridStyle,
}

impl<'a> RenderContext<'a> {
    /// Snapshot everything a frame needs from the store, the engine and the surface.
    pub fn capture(
        store: &'a dyn ModelStore,
        engine: &'a InteractionEngine,
        surface: &CanvasSurface,
    ) -> Self {
        let theme = store.theme();
        Self {
            components: store.components(),
            selection: store.effective_selected_ids(),
            handle_targets: store.handle_target_ids(),
            camera: store.camera(),
            theme,
            drawing_settings: store.drawing_settings(),
            drawn_paths: engine.drawing().drawn_paths(),
            preview: engine.drawing().current_shape(),
            viewport_size: surface.size(),
            scale_factor: surface.scale_factor(),
            touch_mode: engine.is_touch_mode(store),
            background_color: theme.background.into(),
            grid_style: GridStyle::Lines,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the grid style.
    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    pub fn is_selected(&self, id: ComponentId) -> bool {
        self.selection.contains(&id)
    }

    /// Whether the selection box and handles are drawn for `id`.
    pub fn shows_handles(&self, id: ComponentId) -> bool {
        self.handle_targets.contains(&id)
    }

    /// World rectangle currently on screen.
    pub fn visible_world_rect(&self) -> Rect {
        self.camera.visible_world_rect(self.viewport_size)
    }
}

/// Trait for rendering backends.
///
/// Implementations build a frame's drawing commands from a [`RenderContext`];
/// presenting them to a surface is up to the host.
pub trait Renderer: Send + Sync {
    /// Build the scene/command buffer for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Grid line positions covering `visible`.
///
/// Returns `(xs, ys)` snapped to multiples of the spacing. When zoomed far out
/// the spacing doubles until each axis has at most [`MAX_GRID_LINES`] lines.
pub fn grid_lines(visible: Rect, spacing: f64) -> (Vec<f64>, Vec<f64>) {
    if spacing <= 0.0 || !visible.is_finite() {
        return (Vec::new(), Vec::new());
    }
    let mut spacing = spacing;
    while (visible.width().max(visible.height()) / spacing).ceil() as usize + 1 > MAX_GRID_LINES {
        spacing *= 2.0;
    }
    let axis = |from: f64, to: f64| {
        let start = (from / spacing).floor() as i64;
        let end = (to / spacing).ceil() as i64;
        (start..=end).map(|i| i as f64 * spacing).collect::<Vec<_>>()
    };
    (axis(visible.x0, visible.x1), axis(visible.y0, visible.y1))
}
