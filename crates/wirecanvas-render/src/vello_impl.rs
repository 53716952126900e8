//! Vello-based renderer implementation.

use kurbo::{Affine, BezPath, Cap, Circle, Ellipse, Join, Line, Point, Rect, RoundedRect, Shape as KurboShape, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use vello::Scene;
use wirecanvas_core::component::{Component, ComponentKind, FontWeight, TextAlign};
use wirecanvas_core::handles::{HandleKind, handle_position};
use wirecanvas_core::{Geometry, HandleMetrics, ResolvedStyle, Theme};

use crate::image_cache::ImageCache;
use crate::renderer::{GRID_SIZE, GridStyle, RenderContext, Renderer, grid_lines};

/// Inner horizontal padding for input and text content.
const CONTENT_PADDING: f64 = 8.0;

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Font context for text rendering (system fonts, collected once).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    /// Current zoom level (for zoom-independent UI elements).
    zoom: f64,
    /// Decoded bitmaps keyed by image reference.
    images: ImageCache,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer with the default image loader.
    pub fn new() -> Self {
        Self::with_image_cache(ImageCache::default())
    }

    pub fn with_image_cache(images: ImageCache) -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            zoom: 1.0,
            images,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    pub fn image_cache(&self) -> &ImageCache {
        &self.images
    }

    pub fn image_cache_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    /// Apply finished image loads. Returns true if a repaint would show new bitmaps.
    pub fn poll_images(&mut self) -> bool {
        self.images.drain() > 0
    }

    fn render_grid(&mut self, ctx: &RenderContext, transform: Affine, color: Color) {
        let visible = ctx.visible_world_rect();
        let (xs, ys) = grid_lines(visible, GRID_SIZE);
        let mut path = BezPath::new();
        match ctx.grid_style {
            GridStyle::None => return,
            GridStyle::Lines => {
                for &x in &xs {
                    path.move_to(Point::new(x, visible.y0));
                    path.line_to(Point::new(x, visible.y1));
                }
                for &y in &ys {
                    path.move_to(Point::new(visible.x0, y));
                    path.line_to(Point::new(visible.x1, y));
                }
                let stroke = Stroke::new(1.0 / self.zoom);
                self.scene.stroke(&stroke, transform, color, None, &path);
            }
            GridStyle::Dots => {
                let half = 1.5 / self.zoom;
                for &x in &xs {
                    for &y in &ys {
                        let dot = Rect::new(x - half, y - half, x + half, y + half);
                        path.extend(dot.path_elements(0.1));
                    }
                }
                self.scene.fill(Fill::NonZero, transform, color, None, &path);
            }
        }
    }

    /// Committed pen strokes as round-capped polylines.
    fn render_pen_strokes(&mut self, ctx: &RenderContext, transform: Affine) {
        let settings = ctx.drawing_settings;
        let color: Color = ctx.theme.pen.with_opacity(settings.pen_opacity).into();
        let stroke = Stroke::new(settings.pen_width)
            .with_caps(Cap::Round)
            .with_join(Join::Round);

        for points in ctx.drawn_paths {
            match points.as_slice() {
                [] => {}
                [dot] => {
                    let circle = Circle::new(*dot, settings.pen_width / 2.0);
                    self.scene.fill(Fill::NonZero, transform, color, None, &circle);
                }
                [first, rest @ ..] => {
                    let mut path = BezPath::new();
                    path.move_to(*first);
                    for p in rest {
                        path.line_to(*p);
                    }
                    self.scene.stroke(&stroke, transform, color, None, &path);
                }
            }
        }
    }

    /// Render one component in its rotated frame.
    fn render_component(&mut self, component: &Component, theme: &Theme, world: Affine) {
        let geometry = component.geometry();
        let transform = world * rotation_about_center(&geometry);
        let style = ResolvedStyle::resolve(component, theme);
        let rect = geometry.rect();

        match component.kind {
            ComponentKind::Group => {
                let dash = 6.0 / self.zoom;
                let stroke = Stroke::new(1.0 / self.zoom).with_dashes(0.0, [dash, dash]);
                self.scene
                    .stroke(&stroke, transform, Color::from(style.border), None, &rect);
            }
            ComponentKind::Circle => {
                let ellipse = Ellipse::from_rect(rect);
                self.paint_body(&ellipse, &style, transform);
            }
            _ => {
                let body = RoundedRect::from_rect(rect, style.border_radius);
                self.paint_body(&body, &style, transform);
            }
        }

        match component.kind {
            ComponentKind::Button => {
                let label = component.props.button_text.as_deref().unwrap_or("Button");
                self.render_label(label, rect, &style, TextAlign::Center, true, transform);
            }
            ComponentKind::Input => {
                let placeholder = component.props.placeholder.as_deref().unwrap_or("Enter text...");
                let inner = rect.inset((-CONTENT_PADDING, 0.0));
                self.render_label(placeholder, inner, &style, TextAlign::Left, true, transform);
            }
            ComponentKind::Text => {
                let text = component.props.text.as_deref().unwrap_or("Text");
                self.render_label(text, rect, &style, style.text_align, false, transform);
            }
            ComponentKind::Image => self.render_image(component, rect, theme, transform),
            _ => {}
        }

        if component.is_locked {
            self.render_lock_glyph(rect, theme, transform);
        }
    }

    /// Fill and stroke a component outline, skipping invisible parts.
    fn paint_body(&mut self, shape: &impl KurboShape, style: &ResolvedStyle, transform: Affine) {
        if style.background.a > 0 {
            self.scene
                .fill(Fill::NonZero, transform, Color::from(style.background), None, shape);
        }
        if style.border_width > 0.0 && style.border.a > 0 {
            let stroke = Stroke::new(style.border_width);
            self.scene
                .stroke(&stroke, transform, Color::from(style.border), None, shape);
        }
    }

    /// Lay out `text` with parley and draw it inside `bounds`.
    fn render_label(
        &mut self,
        text: &str,
        bounds: Rect,
        style: &ResolvedStyle,
        align: TextAlign,
        center_vertically: bool,
        transform: Affine,
    ) {
        if text.is_empty() || bounds.width() <= 0.0 {
            return;
        }
        let color = Color::from(style.text_color);
        let brush = Brush::Solid(color);
        let weight = match style.font_weight {
            FontWeight::Normal => parley::FontWeight::NORMAL,
            FontWeight::Bold => parley::FontWeight::BOLD,
        };
        let width = bounds.width() as f32;

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(style.font_size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontWeight(weight));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source("sans-serif".into())));
        let mut layout = builder.build(text);
        layout.break_all_lines(Some(width));
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        let layout_height = layout.height() as f64;
        let top = if center_vertically {
            bounds.y0 + (bounds.height() - layout_height) / 2.0
        } else {
            bounds.y0
        };
        let text_transform = transform * Affine::translate((bounds.x0, top));

        let mut glyph_count = 0;
        for line in layout.lines() {
            let slack = (width - line.metrics().advance).max(0.0);
            let line_offset = match align {
                TextAlign::Left => 0.0,
                TextAlign::Center => slack / 2.0,
                TextAlign::Right => slack,
            };
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset() + line_offset;
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let glyph_xform = run
                    .synthesis()
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph { id: glyph.id, x: gx, y: gy }
                    })
                    .collect();
                glyph_count += glyphs.len();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        // No fonts available: draw a bar where the text would sit
        if glyph_count == 0 {
            let bar_width = (text.chars().count() as f64 * style.font_size * 0.5).min(bounds.width());
            let bar_height = style.font_size * 0.6;
            let x0 = match align {
                TextAlign::Left => bounds.x0,
                TextAlign::Center => bounds.center().x - bar_width / 2.0,
                TextAlign::Right => bounds.x1 - bar_width,
            };
            let y0 = if center_vertically {
                bounds.center().y - bar_height / 2.0
            } else {
                bounds.y0 + style.font_size * 0.2
            };
            let bar = Rect::new(x0, y0, x0 + bar_width, y0 + bar_height);
            let faded: Color = style.text_color.with_opacity(0.35).into();
            self.scene.fill(Fill::NonZero, transform, faded, None, &bar);
        }
    }

    /// Draw the cached bitmap, or a placeholder while it loads or after it failed.
    fn render_image(&mut self, component: &Component, rect: Rect, theme: &Theme, transform: Affine) {
        let Some(reference) = component.props.image_ref.as_deref() else {
            self.render_image_placeholder(rect, theme, transform);
            return;
        };
        self.images.request(reference);
        let Some(image_data) = self.images.get(reference).cloned() else {
            self.render_image_placeholder(rect, theme, transform);
            return;
        };
        if image_data.width == 0 || image_data.height == 0 {
            self.render_image_placeholder(rect, theme, transform);
            return;
        }

        let scale_x = rect.width() / image_data.width as f64;
        let scale_y = rect.height() / image_data.height as f64;
        let image_transform = transform
            * Affine::translate((rect.x0, rect.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);
        self.scene.draw_image(&image_data.into(), image_transform);
    }

    /// Mountain-and-sun glyph centered in the image frame.
    fn render_image_placeholder(&mut self, rect: Rect, theme: &Theme, transform: Affine) {
        let color = Color::from(theme.muted_text);
        let stroke = Stroke::new(1.5).with_join(Join::Round).with_caps(Cap::Round);
        let size = rect.width().min(rect.height()) * 0.4;
        if size <= 0.0 {
            return;
        }
        let c = rect.center();
        let frame = Rect::from_center_size(c, (size * 1.2, size));
        self.scene.stroke(&stroke, transform, color, None, &frame);

        let mut mountains = BezPath::new();
        mountains.move_to(Point::new(frame.x0, frame.y1));
        mountains.line_to(Point::new(frame.x0 + frame.width() * 0.35, frame.y0 + frame.height() * 0.45));
        mountains.line_to(Point::new(frame.x0 + frame.width() * 0.55, frame.y0 + frame.height() * 0.7));
        mountains.line_to(Point::new(frame.x0 + frame.width() * 0.75, frame.y0 + frame.height() * 0.5));
        mountains.line_to(Point::new(frame.x1, frame.y1));
        self.scene.stroke(&stroke, transform, color, None, &mountains);

        let sun = Circle::new(
            Point::new(frame.x0 + frame.width() * 0.75, frame.y0 + frame.height() * 0.25),
            size * 0.08,
        );
        self.scene.stroke(&stroke, transform, color, None, &sun);
    }

    /// Small padlock in the top-right corner, constant on screen.
    fn render_lock_glyph(&mut self, rect: Rect, theme: &Theme, transform: Affine) {
        let unit = 1.0 / self.zoom;
        let body_w = 10.0 * unit;
        let body_h = 8.0 * unit;
        let margin = 4.0 * unit;
        let body = Rect::new(
            rect.x1 - margin - body_w,
            rect.y0 + margin + 5.0 * unit,
            rect.x1 - margin,
            rect.y0 + margin + 5.0 * unit + body_h,
        );
        let color = Color::from(theme.muted_text);
        self.scene.fill(
            Fill::NonZero,
            transform,
            color,
            None,
            &RoundedRect::from_rect(body, 1.5 * unit),
        );
        let shackle = kurbo::Arc::new(
            Point::new(body.center().x, body.y0),
            (3.0 * unit, 4.0 * unit),
            std::f64::consts::PI,
            std::f64::consts::PI,
            0.0,
        );
        self.scene
            .stroke(&Stroke::new(1.5 * unit), transform, color, None, &shackle);
    }

    /// Dashed outline of the shape being drawn, with a tinted fill.
    fn render_preview(&mut self, ctx: &RenderContext, transform: Affine) {
        let Some(preview) = ctx.preview else {
            return;
        };
        let rect = preview.normalized_rect();
        let dash = 4.0 / self.zoom;
        let stroke = Stroke::new(1.0 / self.zoom).with_dashes(0.0, [dash, dash]);
        let outline = Color::from(ctx.theme.selection);
        let tint = Color::from(ctx.theme.preview_fill);

        if preview.kind == ComponentKind::Circle {
            let ellipse = Ellipse::from_rect(rect);
            if ctx.drawing_settings.shape_fill {
                self.scene.fill(Fill::NonZero, transform, tint, None, &ellipse);
            }
            self.scene.stroke(&stroke, transform, outline, None, &ellipse);
        } else {
            if ctx.drawing_settings.shape_fill {
                self.scene.fill(Fill::NonZero, transform, tint, None, &rect);
            }
            self.scene.stroke(&stroke, transform, outline, None, &rect);
        }
    }

    /// Dashed box, eight resize squares and the rotation handle with its stem.
    /// Sizes are divided by zoom so they stay constant on screen.
    fn render_selection(&mut self, geometry: &Geometry, ctx: &RenderContext, world: Affine) {
        let metrics = HandleMetrics::new(ctx.touch_mode, ctx.camera.zoom);
        let selection = Color::from(ctx.theme.selection);
        let handle_fill = Color::from(ctx.theme.handle_fill);
        let rotation = rotation_about_center(geometry);
        let dash = 4.0 / self.zoom;
        let thin = Stroke::new(1.0 / self.zoom);

        let box_stroke = thin.clone().with_dashes(0.0, [dash, dash]);
        self.scene
            .stroke(&box_stroke, world * rotation, selection, None, &geometry.rect());

        let top = handle_position(geometry, HandleKind::Top, &metrics);
        let knob = handle_position(geometry, HandleKind::Rotate, &metrics);
        self.scene
            .stroke(&thin, world, selection, None, &Line::new(top, knob));

        let handle_stroke = Stroke::new(1.5 / self.zoom);
        let angle = geometry.rotation.to_radians();
        for kind in HandleKind::RESIZE {
            let center = handle_position(geometry, kind, &metrics);
            let square = Rect::from_center_size(center, (metrics.size, metrics.size));
            let handle_transform = world * Affine::rotate_about(angle, center);
            self.scene
                .fill(Fill::NonZero, handle_transform, handle_fill, None, &square);
            self.scene
                .stroke(&handle_stroke, handle_transform, selection, None, &square);
        }

        let circle = Circle::new(knob, metrics.size / 2.0);
        self.scene.fill(Fill::NonZero, world, handle_fill, None, &circle);
        self.scene
            .stroke(&handle_stroke, world, selection, None, &circle);
    }
}

/// Rotation of a component's local frame about its center.
fn rotation_about_center(geometry: &Geometry) -> Affine {
    Affine::rotate_about(geometry.rotation.to_radians(), geometry.center())
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        self.zoom = ctx.camera.zoom;

        // Clear the full device-pixel surface
        let device = Rect::new(
            0.0,
            0.0,
            ctx.viewport_size.width * ctx.scale_factor,
            ctx.viewport_size.height * ctx.scale_factor,
        );
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, ctx.background_color, None, &device);

        let world = Affine::scale(ctx.scale_factor) * ctx.camera.transform();

        self.render_grid(ctx, world, Color::from(ctx.theme.grid));
        self.render_pen_strokes(ctx, world);

        for component in ctx.components {
            self.render_component(component, ctx.theme, world);
        }

        self.render_preview(ctx, world);

        for component in ctx.components {
            if !ctx.shows_handles(component.id) {
                continue;
            }
            self.render_selection(&component.geometry(), ctx, world);
        }
    }
}
