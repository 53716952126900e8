//! Model store contract and an in-memory implementation.
//!
//! The store owns the document (components), selection, tool, theme, view
//! transform and drawing settings. The interaction engine reads from it and
//! mutates it only through the methods of [`ModelStore`].

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, clamp_zoom};
use crate::component::{Component, ComponentId, ComponentKind, ComponentPatch, ComponentSpec};
use crate::error::{StoreError, StoreResult};
use crate::library::{Library, LibraryTemplate};
use crate::theme::{DrawingSettings, Theme};

/// The active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Pen,
    Rectangle,
    Circle,
    Text,
    Button,
    Input,
    Image,
}

impl Tool {
    /// Component kind created by a shape tool.
    pub fn component_kind(self) -> Option<ComponentKind> {
        match self {
            Tool::Rectangle => Some(ComponentKind::Rectangle),
            Tool::Circle => Some(ComponentKind::Circle),
            Tool::Text => Some(ComponentKind::Text),
            Tool::Button => Some(ComponentKind::Button),
            Tool::Input => Some(ComponentKind::Input),
            Tool::Image => Some(ComponentKind::Image),
            Tool::Select | Tool::Pen => None,
        }
    }

    pub fn is_shape_tool(self) -> bool {
        self.component_kind().is_some()
    }

    /// Pen and shape tools draw on pointer-down.
    pub fn is_drawing_tool(self) -> bool {
        self == Tool::Pen || self.is_shape_tool()
    }
}

/// How `select_component` combines with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Replace the selection (or clear it when no id is given).
    Replace,
    /// Add if absent, remove if present.
    Toggle,
    /// Add if absent.
    Add,
}

/// A view update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub zoom: Option<f64>,
    pub pan: Option<Vec2>,
}

impl ViewTransform {
    pub fn new(zoom: f64, pan: Vec2) -> Self {
        Self {
            zoom: Some(zoom),
            pan: Some(pan),
        }
    }

    pub fn apply(&self, camera: &mut Camera) {
        if let Some(zoom) = self.zoom {
            camera.zoom = clamp_zoom(zoom);
        }
        if let Some(pan) = self.pan {
            camera.pan = pan;
        }
    }
}

/// Read/write access to the shared editor model.
pub trait ModelStore {
    /// Components in z-order, bottom first.
    fn components(&self) -> &[Component];

    fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components().iter().find(|c| c.id == id)
    }

    /// Directly selected ids, in selection order.
    fn selected_ids(&self) -> &[ComponentId];

    /// Selection expanded with the members of selected groups.
    fn effective_selected_ids(&self) -> Vec<ComponentId> {
        let mut ids: Vec<ComponentId> = Vec::new();
        for &id in self.selected_ids() {
            if !ids.contains(&id) {
                ids.push(id);
            }
            if let Some(group) = self.component(id) {
                for &child in &group.child_ids {
                    if !ids.contains(&child) && self.component(child).is_some() {
                        ids.push(child);
                    }
                }
            }
        }
        ids
    }

    /// Whether a component is locked directly or through its group.
    fn is_locked(&self, id: ComponentId) -> bool {
        let Some(component) = self.component(id) else {
            return false;
        };
        component.is_locked
            || component
                .group_id
                .and_then(|g| self.component(g))
                .is_some_and(|g| g.is_locked)
    }

    /// Effective selection without locked components; these show handles.
    fn handle_target_ids(&self) -> Vec<ComponentId> {
        let mut ids = self.effective_selected_ids();
        ids.retain(|&id| !self.is_locked(id));
        ids
    }

    fn current_tool(&self) -> Tool;
    fn theme(&self) -> &Theme;
    fn camera(&self) -> Camera;
    fn drawing_settings(&self) -> DrawingSettings;
    fn is_mobile_mode(&self) -> bool;

    fn add_component(&mut self, spec: ComponentSpec) -> ComponentId;

    /// Instantiate a library template with its top-left at `position`.
    /// Returns the id of the top-level component created.
    fn add_library_component(&mut self, template_key: &str, position: Point) -> StoreResult<ComponentId>;

    fn update_component(&mut self, id: ComponentId, patch: ComponentPatch) -> StoreResult<()>;

    fn select_component(&mut self, id: Option<ComponentId>, mode: SelectMode);

    fn set_view_transform(&mut self, transform: ViewTransform);

    fn set_tool(&mut self, tool: Tool);

    /// Declared size of a library template, used to center drops.
    fn library_template_size(&self, _template_key: &str) -> Option<kurbo::Size> {
        None
    }
}

/// In-memory store used by tests, headless replays and simple hosts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStore {
    components: Vec<Component>,
    selected_ids: Vec<ComponentId>,
    tool: Tool,
    theme: Theme,
    camera: Camera,
    drawing_settings: DrawingSettings,
    mobile_mode: bool,
    #[serde(skip)]
    library: Library,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library(mut self, library: Library) -> Self {
        self.library = library;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn set_mobile_mode(&mut self, mobile: bool) {
        self.mobile_mode = mobile;
    }

    pub fn set_drawing_settings(&mut self, settings: DrawingSettings) {
        self.drawing_settings = settings;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Insert a fully formed component (used to load documents).
    pub fn insert(&mut self, component: Component) {
        self.components.push(component);
    }

    pub fn remove(&mut self, id: ComponentId) -> Option<Component> {
        let index = self.components.iter().position(|c| c.id == id)?;
        self.selected_ids.retain(|s| *s != id);
        Some(self.components.remove(index))
    }

    fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id == id)
    }

    fn instantiate_template(&mut self, template: &LibraryTemplate, position: Point) -> ComponentId {
        let specs = template.instantiate(position);
        if let [spec] = specs.as_slice() {
            return self.add_component(spec.clone());
        }

        let mut group = Component::from_spec(ComponentSpec::new(
            ComponentKind::Group,
            Rect::from_origin_size(position, template.size()),
        ));
        let group_id = group.id;
        for spec in specs {
            let mut child = Component::from_spec(spec);
            child.group_id = Some(group_id);
            group.child_ids.push(child.id);
            self.components.push(child);
        }
        self.components.push(group);
        group_id
    }
}

impl ModelStore for MemoryStore {
    fn components(&self) -> &[Component] {
        &self.components
    }

    fn selected_ids(&self) -> &[ComponentId] {
        &self.selected_ids
    }

    fn current_tool(&self) -> Tool {
        self.tool
    }

    fn theme(&self) -> &Theme {
        &self.theme
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn drawing_settings(&self) -> DrawingSettings {
        self.drawing_settings
    }

    fn is_mobile_mode(&self) -> bool {
        self.mobile_mode
    }

    fn add_component(&mut self, spec: ComponentSpec) -> ComponentId {
        let component = Component::from_spec(spec);
        let id = component.id;
        log::debug!("Added {} component {}", component.kind.name(), id);
        self.components.push(component);
        id
    }

    fn add_library_component(&mut self, template_key: &str, position: Point) -> StoreResult<ComponentId> {
        let template = self
            .library
            .get(template_key)
            .cloned()
            .ok_or_else(|| StoreError::UnknownTemplate(template_key.to_string()))?;
        if template.components.is_empty() {
            return Err(StoreError::EmptyTemplate(template_key.to_string()));
        }
        let id = self.instantiate_template(&template, position);
        self.selected_ids = vec![id];
        Ok(id)
    }

    fn update_component(&mut self, id: ComponentId, patch: ComponentPatch) -> StoreResult<()> {
        let component = self
            .component_mut(id)
            .ok_or(StoreError::UnknownComponent(id))?;
        patch.apply(component);
        Ok(())
    }

    fn select_component(&mut self, id: Option<ComponentId>, mode: SelectMode) {
        let Some(id) = id else {
            if mode == SelectMode::Replace {
                self.selected_ids.clear();
            }
            return;
        };
        if self.component(id).is_none() {
            log::debug!("Ignoring selection of unknown component {id}");
            return;
        }
        match mode {
            SelectMode::Replace => self.selected_ids = vec![id],
            SelectMode::Toggle => {
                if let Some(index) = self.selected_ids.iter().position(|s| *s == id) {
                    self.selected_ids.remove(index);
                } else {
                    self.selected_ids.push(id);
                }
            }
            SelectMode::Add => {
                if !self.selected_ids.contains(&id) {
                    self.selected_ids.push(id);
                }
            }
        }
    }

    fn set_view_transform(&mut self, transform: ViewTransform) {
        transform.apply(&mut self.camera);
    }

    fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    fn library_template_size(&self, template_key: &str) -> Option<kurbo::Size> {
        self.library.get(template_key).map(LibraryTemplate::size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_spec(x: f64, y: f64) -> ComponentSpec {
        ComponentSpec::new(ComponentKind::Rectangle, Rect::new(x, y, x + 10.0, y + 10.0))
    }

    fn library() -> Library {
        let mut library = Library::new();
        library.insert(
            "pair",
            LibraryTemplate {
                name: "Pair".into(),
                width: 30.0,
                height: 10.0,
                components: vec![rect_spec(0.0, 0.0), rect_spec(20.0, 0.0)],
            },
        );
        library.insert(
            "single",
            LibraryTemplate {
                name: "Single".into(),
                width: 10.0,
                height: 10.0,
                components: vec![rect_spec(0.0, 0.0)],
            },
        );
        library
    }

    #[test]
    fn test_add_and_update() {
        let mut store = MemoryStore::new();
        let id = store.add_component(rect_spec(0.0, 0.0));
        store
            .update_component(id, ComponentPatch::position(Point::new(5.0, 6.0)))
            .unwrap();
        assert_eq!(store.component(id).unwrap().origin(), Point::new(5.0, 6.0));
    }

    #[test]
    fn test_update_unknown_component() {
        let mut store = MemoryStore::new();
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            store.update_component(id, ComponentPatch::default()),
            Err(StoreError::UnknownComponent(id))
        );
    }

    #[test]
    fn test_select_modes() {
        let mut store = MemoryStore::new();
        let a = store.add_component(rect_spec(0.0, 0.0));
        let b = store.add_component(rect_spec(20.0, 0.0));

        store.select_component(Some(a), SelectMode::Replace);
        store.select_component(Some(b), SelectMode::Toggle);
        assert_eq!(store.selected_ids(), &[a, b]);
        store.select_component(Some(a), SelectMode::Toggle);
        assert_eq!(store.selected_ids(), &[b]);
        store.select_component(Some(b), SelectMode::Add);
        assert_eq!(store.selected_ids(), &[b]);
        store.select_component(None, SelectMode::Toggle);
        assert_eq!(store.selected_ids().len(), 1);
        store.select_component(None, SelectMode::Replace);
        assert!(store.selected_ids().is_empty());
    }

    #[test]
    fn test_library_template_creates_group() {
        let mut store = MemoryStore::new().with_library(library());
        let group = store
            .add_library_component("pair", Point::new(100.0, 100.0))
            .unwrap();
        assert_eq!(store.components().len(), 3);
        let g = store.component(group).unwrap();
        assert!(g.is_group());
        assert_eq!(g.child_ids.len(), 2);
        assert_eq!(store.selected_ids(), &[group]);

        let effective = store.effective_selected_ids();
        assert_eq!(effective.len(), 3);
        let second = store.component(g.child_ids[1]).unwrap();
        assert!((second.x - 120.0).abs() < f64::EPSILON);
        assert_eq!(second.group_id, Some(group));
    }

    #[test]
    fn test_group_lock_removes_member_handles() {
        let mut store = MemoryStore::new().with_library(library());
        let group = store.add_library_component("pair", Point::ZERO).unwrap();
        let members = store.component(group).unwrap().child_ids.clone();
        assert_eq!(store.handle_target_ids().len(), 3);

        let lock = ComponentPatch {
            is_locked: Some(true),
            ..Default::default()
        };
        store.update_component(group, lock).unwrap();
        assert!(members.iter().all(|&m| store.is_locked(m)));
        assert!(!store.component(members[0]).unwrap().is_locked);
        assert!(store.handle_target_ids().is_empty());
        assert_eq!(store.effective_selected_ids().len(), 3);
    }

    #[test]
    fn test_library_single_component_is_not_grouped() {
        let mut store = MemoryStore::new().with_library(library());
        let id = store.add_library_component("single", Point::new(1.0, 2.0)).unwrap();
        assert_eq!(store.components().len(), 1);
        assert_eq!(store.component(id).unwrap().kind, ComponentKind::Rectangle);
    }

    #[test]
    fn test_library_unknown_template() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.add_library_component("missing", Point::ZERO),
            Err(StoreError::UnknownTemplate("missing".into()))
        );
    }

    #[test]
    fn test_view_transform_partial_and_clamped() {
        let mut store = MemoryStore::new();
        store.set_view_transform(ViewTransform {
            zoom: Some(9.0),
            pan: None,
        });
        assert!((store.camera().zoom - 4.0).abs() < f64::EPSILON);
        assert_eq!(store.camera().pan, Vec2::ZERO);
        store.set_view_transform(ViewTransform::new(0.5, Vec2::new(3.0, 4.0)));
        assert_eq!(store.camera(), Camera::new(Vec2::new(3.0, 4.0), 0.5));
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut store = MemoryStore::new();
        let id = store.add_component(rect_spec(0.0, 0.0));
        store.select_component(Some(id), SelectMode::Replace);
        assert!(store.remove(id).is_some());
        assert!(store.selected_ids().is_empty());
    }

    #[test]
    fn test_tool_classification() {
        assert!(Tool::Pen.is_drawing_tool());
        assert!(!Tool::Pen.is_shape_tool());
        assert_eq!(Tool::Button.component_kind(), Some(ComponentKind::Button));
        assert!(!Tool::Select.is_drawing_tool());
    }
}
