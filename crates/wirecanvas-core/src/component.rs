//! Wireframe component data model.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Rgba;
use crate::geometry::rotate_point;

/// Unique identifier for components.
pub type ComponentId = Uuid;

/// Kind of wireframe component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Rectangle,
    Circle,
    Button,
    Input,
    Text,
    Image,
    Group,
}

impl ComponentKind {
    /// Size used when a component is placed without a drag.
    pub fn default_size(self) -> Size {
        match self {
            ComponentKind::Rectangle => Size::new(160.0, 100.0),
            ComponentKind::Circle => Size::new(100.0, 100.0),
            ComponentKind::Button => Size::new(120.0, 40.0),
            ComponentKind::Input => Size::new(200.0, 36.0),
            ComponentKind::Text => Size::new(160.0, 32.0),
            ComponentKind::Image => Size::new(160.0, 120.0),
            ComponentKind::Group => Size::new(200.0, 200.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Rectangle => "rectangle",
            ComponentKind::Circle => "circle",
            ComponentKind::Button => "button",
            ComponentKind::Input => "input",
            ComponentKind::Text => "text",
            ComponentKind::Image => "image",
            ComponentKind::Group => "group",
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font weight for component text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Optional visual properties. Missing values fall back to theme defaults
/// for the component kind (see [`crate::theme::ResolvedStyle`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image reference (URL or data URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl ComponentProps {
    /// Overlay every property set in `other` onto `self`.
    pub fn merge(&mut self, other: &ComponentProps) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field.clone(); })*
            };
        }
        take!(
            background_color,
            border_color,
            text_color,
            border_width,
            border_radius,
            font_size,
            font_weight,
            text_align,
            button_text,
            placeholder,
            text,
            image_ref
        );
    }
}

/// Position, size and rotation of a component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation about the center, in degrees.
    pub rotation: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Unrotated bounds.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether a world point lies inside the rotated rectangle.
    pub fn contains(&self, world: Point) -> bool {
        let local = rotate_point(world, self.center(), -self.rotation);
        local.x >= self.x
            && local.x <= self.x + self.width
            && local.y >= self.y
            && local.y <= self.y + self.height
    }

    /// Corners of the rotated rectangle in world space (tl, tr, br, bl).
    pub fn corners(&self) -> [Point; 4] {
        let c = self.center();
        let r = self.rect();
        [
            rotate_point(Point::new(r.x0, r.y0), c, self.rotation),
            rotate_point(Point::new(r.x1, r.y0), c, self.rotation),
            rotate_point(Point::new(r.x1, r.y1), c, self.rotation),
            rotate_point(Point::new(r.x0, r.y1), c, self.rotation),
        ]
    }
}

/// A wireframe component on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation about the center, in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub props: ComponentProps,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<ComponentId>,
}

impl Component {
    /// Create a component from a spec with a fresh id.
    pub fn from_spec(spec: ComponentSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: spec.kind,
            x: spec.x,
            y: spec.y,
            width: spec.width,
            height: spec.height,
            rotation: spec.rotation,
            props: spec.props,
            is_locked: spec.is_locked,
            group_id: None,
            child_ids: Vec::new(),
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
        }
    }

    pub fn set_geometry(&mut self, g: Geometry) {
        self.x = g.x;
        self.y = g.y;
        self.width = g.width;
        self.height = g.height;
        self.rotation = g.rotation;
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        self.geometry().center()
    }

    pub fn rect(&self) -> Rect {
        self.geometry().rect()
    }

    /// Whether a world point lies inside the rotated body.
    pub fn contains(&self, world: Point) -> bool {
        self.geometry().contains(world)
    }

    pub fn is_group(&self) -> bool {
        self.kind == ComponentKind::Group
    }
}

/// Description of a component to create; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub props: ComponentProps,
    #[serde(default)]
    pub is_locked: bool,
}

impl ComponentSpec {
    pub fn new(kind: ComponentKind, rect: Rect) -> Self {
        Self {
            kind,
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            rotation: 0.0,
            props: ComponentProps::default(),
            is_locked: false,
        }
    }

    pub fn with_props(mut self, props: ComponentProps) -> Self {
        self.props = props;
        self
    }

    /// Same spec translated by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..self.clone()
        }
    }
}

/// Partial update for a component; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub is_locked: Option<bool>,
    pub props: Option<ComponentProps>,
}

impl ComponentPatch {
    /// Patch that moves a component's origin.
    pub fn position(p: Point) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            ..Self::default()
        }
    }

    /// Patch that sets full geometry.
    pub fn geometry(g: Geometry) -> Self {
        Self {
            x: Some(g.x),
            y: Some(g.y),
            width: Some(g.width),
            height: Some(g.height),
            rotation: Some(g.rotation),
            ..Self::default()
        }
    }

    /// Patch that sets only the rotation.
    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn apply(&self, component: &mut Component) {
        if let Some(x) = self.x {
            component.x = x;
        }
        if let Some(y) = self.y {
            component.y = y;
        }
        if let Some(w) = self.width {
            component.width = w.max(0.0);
        }
        if let Some(h) = self.height {
            component.height = h.max(0.0);
        }
        if let Some(r) = self.rotation {
            component.rotation = r;
        }
        if let Some(locked) = self.is_locked {
            component.is_locked = locked;
        }
        if let Some(props) = &self.props {
            component.props.merge(props);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Component {
        Component::from_spec(ComponentSpec::new(
            ComponentKind::Rectangle,
            Rect::new(0.0, 0.0, 100.0, 100.0),
        ))
    }

    #[test]
    fn test_contains_unrotated() {
        let c = square();
        assert!(c.contains(Point::new(50.0, 50.0)));
        assert!(c.contains(Point::new(0.0, 100.0)));
        assert!(!c.contains(Point::new(101.0, 50.0)));
    }

    #[test]
    fn test_contains_rotated() {
        let mut c = square();
        c.rotation = 45.0;
        // Corner of the unrotated square is outside once rotated
        assert!(!c.contains(Point::new(2.0, 2.0)));
        // Tip of the diamond sticks out above the original top edge
        assert!(c.contains(Point::new(50.0, -15.0)));
    }

    #[test]
    fn test_corners_rotated_quarter_turn() {
        let mut c = square();
        c.width = 200.0;
        c.rotation = 90.0;
        let [tl, ..] = c.geometry().corners();
        assert!((tl.x - 150.0).abs() < 1e-9);
        assert!((tl.y - -50.0).abs() < 1e-9);
    }

    #[test]
    fn test_patch_apply() {
        let mut c = square();
        let patch = ComponentPatch {
            width: Some(-5.0),
            props: Some(ComponentProps {
                button_text: Some("OK".into()),
                ..Default::default()
            }),
            ..ComponentPatch::position(Point::new(3.0, 4.0))
        };
        patch.apply(&mut c);
        assert_eq!(c.origin(), Point::new(3.0, 4.0));
        assert!((c.width - 0.0).abs() < f64::EPSILON);
        assert_eq!(c.props.button_text.as_deref(), Some("OK"));
    }

    #[test]
    fn test_props_merge_keeps_unset_fields() {
        let mut props = ComponentProps {
            font_size: Some(14.0),
            text: Some("Title".into()),
            ..Default::default()
        };
        props.merge(&ComponentProps {
            text: Some("Subtitle".into()),
            ..Default::default()
        });
        assert_eq!(props.font_size, Some(14.0));
        assert_eq!(props.text.as_deref(), Some("Subtitle"));
    }

    #[test]
    fn test_serialization_shape() {
        let mut c = square();
        c.props.background_color = Some(Rgba::WHITE);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["isLocked"], false);
        assert_eq!(json["props"]["backgroundColor"], "#ffffff");
        assert!(json.get("groupId").is_none());

        let back: Component = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }
}
