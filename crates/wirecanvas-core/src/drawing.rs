//! Pen strokes and shape previews produced by the drawing tools.

use kurbo::{Point, Rect};

use crate::component::{ComponentKind, ComponentProps, ComponentSpec};
use crate::theme::{ResolvedStyle, Theme};

/// Drags smaller than this (world units, both axes) count as a click and
/// place the kind's default size.
pub const MIN_DRAG_SIZE: f64 = 2.0;

/// A shape being drawn. Width and height are signed until committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePreview {
    pub kind: ComponentKind,
    pub start: Point,
    pub width: f64,
    pub height: f64,
    /// Properties the committed component starts with.
    pub props: ComponentProps,
}

impl ShapePreview {
    pub fn new(kind: ComponentKind, start: Point) -> Self {
        Self {
            kind,
            start,
            width: 0.0,
            height: 0.0,
            props: ComponentProps::default(),
        }
    }

    pub fn with_props(mut self, props: ComponentProps) -> Self {
        self.props = props;
        self
    }

    /// The preview rectangle with negative extents flipped.
    pub fn normalized_rect(&self) -> Rect {
        Rect::new(
            self.start.x,
            self.start.y,
            self.start.x + self.width,
            self.start.y + self.height,
        )
        .abs()
    }

    /// Whether the drag is too small to define a size.
    pub fn is_click(&self) -> bool {
        self.width.abs() < MIN_DRAG_SIZE && self.height.abs() < MIN_DRAG_SIZE
    }

    /// The component this preview commits to.
    pub fn to_spec(&self) -> ComponentSpec {
        let rect = if self.is_click() {
            Rect::from_origin_size(self.start, self.kind.default_size())
        } else {
            self.normalized_rect()
        };
        ComponentSpec::new(self.kind, rect).with_props(self.props.clone())
    }
}

/// Transient output of the drawing tools.
#[derive(Debug, Clone, Default)]
pub struct DrawingState {
    drawn_paths: Vec<Vec<Point>>,
    stroke_active: bool,
    current_shape: Option<ShapePreview>,
}

impl DrawingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed and in-progress pen strokes, in drawing order.
    pub fn drawn_paths(&self) -> &[Vec<Point>] {
        &self.drawn_paths
    }

    pub fn current_shape(&self) -> Option<&ShapePreview> {
        self.current_shape.as_ref()
    }

    pub fn is_stroke_active(&self) -> bool {
        self.stroke_active
    }

    pub fn begin_stroke(&mut self, point: Point) {
        self.drawn_paths.push(vec![point]);
        self.stroke_active = true;
    }

    /// Append a point to the active stroke. Ignored when no stroke is active.
    pub fn extend_stroke(&mut self, point: Point) {
        if !self.stroke_active {
            return;
        }
        if let Some(path) = self.drawn_paths.last_mut() {
            path.push(point);
        }
    }

    pub fn end_stroke(&mut self) {
        self.stroke_active = false;
    }

    /// Drop all strokes (after an external analysis step consumed them).
    pub fn clear_paths(&mut self) {
        self.drawn_paths.clear();
        self.stroke_active = false;
    }

    /// Hand the strokes over and clear them.
    pub fn take_paths(&mut self) -> Vec<Vec<Point>> {
        self.stroke_active = false;
        std::mem::take(&mut self.drawn_paths)
    }

    /// Start a preview carrying the theme's defaults for `kind`, fixed at
    /// the moment the shape is drawn.
    pub fn begin_shape(&mut self, kind: ComponentKind, start: Point, theme: &Theme) {
        let props = ResolvedStyle::defaults(kind, theme).into_props();
        self.current_shape = Some(ShapePreview::new(kind, start).with_props(props));
    }

    pub fn update_shape(&mut self, point: Point) {
        if let Some(shape) = self.current_shape.as_mut() {
            shape.width = point.x - shape.start.x;
            shape.height = point.y - shape.start.y;
        }
    }

    /// Finish the preview, returning the normalized component to create.
    pub fn commit_shape(&mut self) -> Option<ComponentSpec> {
        self.current_shape.take().map(|shape| shape.to_spec())
    }

    pub fn cancel_shape(&mut self) {
        self.current_shape = None;
    }
}
