//! Pointer interaction state machine.
//!
//! [`InteractionEngine`] turns pointer, wheel and drop events into store
//! mutations. It keeps only transient state (the current action and a
//! snapshot of the geometry it started from); everything persistent lives in
//! the [`ModelStore`] passed in with each event.

use std::collections::HashMap;

use kurbo::{Point, Vec2};

use crate::camera::WHEEL_ZOOM_STEP;
use crate::component::{ComponentId, ComponentPatch, Geometry};
use crate::drawing::DrawingState;
use crate::geometry::{CursorHint, cursor_for_handle};
use crate::handles::{HandleKind, HandleMetrics};
use crate::haptics::{HapticKind, Haptics};
use crate::hit_test::{HitResult, resolve_action};
use crate::input::{PointerButton, PointerInput, PointerKind, WheelInput};
use crate::library::DropPayload;
use crate::manipulation::{follow_group, resize_geometry, rotate_geometry};
use crate::store::{ModelStore, SelectMode, Tool, ViewTransform};
use crate::surface::CanvasSurface;

/// The interaction in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionState {
    #[default]
    None,
    Drawing,
    Moving,
    Resizing,
    Rotating,
    Panning,
}

/// Everything an event handler may read or mutate.
pub struct InteractionContext<'a> {
    pub store: &'a mut dyn ModelStore,
    pub surface: &'a CanvasSurface,
    pub haptics: &'a dyn Haptics,
}

impl<'a> InteractionContext<'a> {
    pub fn new(
        store: &'a mut dyn ModelStore,
        surface: &'a CanvasSurface,
        haptics: &'a dyn Haptics,
    ) -> Self {
        Self {
            store,
            surface,
            haptics,
        }
    }

    /// World position of a client-space point under the current camera.
    pub fn to_world(&self, client: Point) -> Point {
        let canvas = self.surface.screen_to_canvas(client);
        self.store.camera().canvas_to_world(canvas)
    }
}

/// Geometry captured when a move, resize or rotate begins.
#[derive(Debug, Clone, Default)]
struct TransformSnapshot {
    start: Point,
    target: Option<ComponentId>,
    handle: Option<HandleKind>,
    originals: HashMap<ComponentId, Geometry>,
    move_offsets: HashMap<ComponentId, Vec2>,
}

/// Pointer interaction state machine.
#[derive(Debug, Clone, Default)]
pub struct InteractionEngine {
    action: ActionState,
    snapshot: Option<TransformSnapshot>,
    last_canvas: Point,
    drawing: DrawingState,
    cursor: CursorHint,
    pointer_kind: PointerKind,
}

impl InteractionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self) -> ActionState {
        self.action
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut DrawingState {
        &mut self.drawing
    }

    /// Handle being dragged during a resize.
    pub fn active_handle(&self) -> Option<HandleKind> {
        self.snapshot.as_ref().and_then(|s| s.handle)
    }

    /// Component being resized or rotated.
    pub fn active_target(&self) -> Option<ComponentId> {
        self.snapshot.as_ref().and_then(|s| s.target)
    }

    /// Touch mode enlarges handles and enables haptics.
    pub fn is_touch_mode(&self, store: &dyn ModelStore) -> bool {
        store.is_mobile_mode() || self.pointer_kind == PointerKind::Touch
    }

    pub fn handle_metrics(&self, store: &dyn ModelStore) -> HandleMetrics {
        HandleMetrics::new(self.is_touch_mode(store), store.camera().zoom)
    }

    pub fn pointer_down(&mut self, ctx: &mut InteractionContext<'_>, input: PointerInput) {
        if self.action != ActionState::None {
            log::debug!("Pointer down during {:?}, resetting", self.action);
            self.cancel(ctx);
        }
        self.pointer_kind = input.kind;

        let canvas = ctx.surface.screen_to_canvas(input.position);
        let world = ctx.store.camera().canvas_to_world(canvas);

        let wants_pan = input.button == PointerButton::Middle
            || (input.button == PointerButton::Primary && input.modifiers.command());
        if wants_pan {
            self.last_canvas = canvas;
            self.set_action(ActionState::Panning);
            self.cursor = CursorHint::Grabbing;
            return;
        }
        if input.button != PointerButton::Primary {
            return;
        }

        let tool = ctx.store.current_tool();
        if tool == Tool::Pen {
            self.drawing.begin_stroke(world);
            self.set_action(ActionState::Drawing);
            ctx.surface.request_repaint();
            return;
        }
        if let Some(kind) = tool.component_kind() {
            self.drawing.begin_shape(kind, world, ctx.store.theme());
            self.set_action(ActionState::Drawing);
            ctx.surface.request_repaint();
            return;
        }

        let touch = self.is_touch_mode(&*ctx.store);
        let selection = ctx.store.handle_target_ids();
        let metrics = self.handle_metrics(&*ctx.store);
        match resolve_action(world, ctx.store.components(), &selection, &metrics) {
            HitResult::Resize { id, handle } => {
                self.begin_transform(ctx, id, Some(handle), world, ActionState::Resizing);
            }
            HitResult::Rotate { id } => {
                self.begin_transform(ctx, id, None, world, ActionState::Rotating);
            }
            HitResult::Move { id } => {
                self.begin_move(ctx, id, world, input.modifiers.shift, touch);
            }
            HitResult::None => {
                if !input.modifiers.shift {
                    ctx.store.select_component(None, SelectMode::Replace);
                }
            }
        }
        ctx.surface.request_repaint();
    }

    pub fn pointer_move(&mut self, ctx: &mut InteractionContext<'_>, input: PointerInput) {
        let canvas = ctx.surface.screen_to_canvas(input.position);
        let camera = ctx.store.camera();
        let world = camera.canvas_to_world(canvas);

        match self.action {
            ActionState::None => {
                self.pointer_kind = input.kind;
                self.cursor = self.hover_cursor(&*ctx.store, world);
                return;
            }
            ActionState::Drawing => {
                if self.drawing.is_stroke_active() {
                    self.drawing.extend_stroke(world);
                } else {
                    self.drawing.update_shape(world);
                }
            }
            ActionState::Moving => self.apply_move(ctx, world),
            ActionState::Resizing => self.apply_resize(ctx, world, input.modifiers.shift),
            ActionState::Rotating => self.apply_rotate(ctx, world, input.modifiers.shift),
            ActionState::Panning => {
                let delta = canvas - self.last_canvas;
                self.last_canvas = canvas;
                ctx.store.set_view_transform(ViewTransform {
                    zoom: None,
                    pan: Some(camera.pan + delta),
                });
            }
        }
        ctx.surface.request_repaint();
    }

    pub fn pointer_up(&mut self, ctx: &mut InteractionContext<'_>, _input: PointerInput) {
        self.release(ctx);
    }

    /// Finish the current action. Also wired to a window-level pointer-up so
    /// releases outside the surface never leave an action stuck.
    pub fn release(&mut self, ctx: &mut InteractionContext<'_>) {
        if self.action == ActionState::Drawing {
            if self.drawing.is_stroke_active() {
                self.drawing.end_stroke();
            } else if let Some(spec) = self.drawing.commit_shape() {
                let kind = spec.kind;
                let id = ctx.store.add_component(spec);
                ctx.store.select_component(Some(id), SelectMode::Replace);
                log::debug!("Committed {} {}", kind.name(), id);
                if self.is_touch_mode(&*ctx.store) {
                    ctx.haptics.trigger(HapticKind::Impact);
                }
            }
        }
        if self.action != ActionState::None {
            ctx.surface.request_repaint();
        }
        self.reset();
    }

    /// Abandon the current action without committing a shape preview.
    /// Partial pen strokes are kept.
    pub fn cancel(&mut self, ctx: &mut InteractionContext<'_>) {
        if self.action != ActionState::None {
            log::debug!("Cancelled {:?}", self.action);
            ctx.surface.request_repaint();
        }
        self.drawing.cancel_shape();
        self.drawing.end_stroke();
        self.reset();
    }

    /// Zoom about the cursor, or pan when shift is held.
    pub fn wheel(&mut self, ctx: &mut InteractionContext<'_>, input: WheelInput) {
        let canvas = ctx.surface.screen_to_canvas(input.position);
        let mut camera = ctx.store.camera();
        if input.modifiers.shift {
            camera.pan_by(-input.delta);
        } else if input.delta.y < 0.0 {
            camera.zoom_about(canvas, WHEEL_ZOOM_STEP);
        } else if input.delta.y > 0.0 {
            camera.zoom_about(canvas, 1.0 / WHEEL_ZOOM_STEP);
        } else {
            return;
        }
        ctx.store
            .set_view_transform(ViewTransform::new(camera.zoom, camera.pan));
        ctx.surface.request_repaint();
    }

    /// Whether a drag hovering the surface can be dropped.
    pub fn drag_over(&self, payload: Option<&DropPayload>) -> bool {
        payload.is_some()
    }

    /// Instantiate the dragged library template centered on the drop point.
    pub fn handle_drop(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        client: Point,
        payload: &DropPayload,
    ) -> Option<ComponentId> {
        let world = ctx.to_world(client);
        let declared = ctx.store.library_template_size(&payload.template_key);
        let origin = payload.placement(world, declared);
        match ctx
            .store
            .add_library_component(&payload.template_key, origin)
        {
            Ok(id) => {
                ctx.surface.request_repaint();
                Some(id)
            }
            Err(err) => {
                log::warn!("Drop rejected: {err}");
                None
            }
        }
    }

    fn set_action(&mut self, action: ActionState) {
        if self.action != action {
            log::trace!("Interaction {:?} -> {:?}", self.action, action);
        }
        self.action = action;
    }

    fn reset(&mut self) {
        self.set_action(ActionState::None);
        self.snapshot = None;
        self.cursor = CursorHint::Default;
    }

    fn hover_cursor(&self, store: &dyn ModelStore, world: Point) -> CursorHint {
        if store.current_tool().is_drawing_tool() {
            return CursorHint::Crosshair;
        }
        let selection = store.handle_target_ids();
        let metrics = self.handle_metrics(store);
        match resolve_action(world, store.components(), &selection, &metrics) {
            HitResult::Resize { id, handle } => {
                let rotation = store.component(id).map(|c| c.rotation).unwrap_or(0.0);
                cursor_for_handle(handle, rotation)
            }
            HitResult::Rotate { .. } => CursorHint::Grab,
            HitResult::Move { id } if store.is_locked(id) => CursorHint::Default,
            HitResult::Move { .. } => CursorHint::Move,
            HitResult::None => CursorHint::Default,
        }
    }

    fn begin_transform(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        id: ComponentId,
        handle: Option<HandleKind>,
        world: Point,
        action: ActionState,
    ) {
        if ctx.store.is_locked(id) {
            log::debug!("Transform target {id} is locked");
            return;
        }
        let Some(component) = ctx.store.component(id) else {
            log::debug!("Transform target {id} no longer exists");
            return;
        };
        let mut originals = HashMap::new();
        originals.insert(id, component.geometry());
        // Unlocked members follow their group
        for &child in &component.child_ids {
            match ctx.store.component(child) {
                Some(member) if !member.is_locked => {
                    originals.insert(child, member.geometry());
                }
                _ => {}
            }
        }
        self.cursor = match handle {
            Some(h) => cursor_for_handle(h, component.rotation),
            None => CursorHint::Grabbing,
        };
        self.snapshot = Some(TransformSnapshot {
            start: world,
            target: Some(id),
            handle,
            originals,
            move_offsets: HashMap::new(),
        });
        self.set_action(action);
    }

    fn begin_move(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        hit: ComponentId,
        world: Point,
        toggle: bool,
        touch: bool,
    ) {
        let target = selection_target(&*ctx.store, hit);
        let was_selected = ctx.store.selected_ids().contains(&target);

        if toggle {
            ctx.store.select_component(Some(target), SelectMode::Toggle);
            if was_selected {
                // Shift-click removed it from the selection
                return;
            }
        } else if !was_selected {
            ctx.store.select_component(Some(target), SelectMode::Replace);
        }
        if !was_selected && touch {
            ctx.haptics.trigger(HapticKind::Selection);
        }

        let mut snapshot = TransformSnapshot {
            start: world,
            ..TransformSnapshot::default()
        };
        for id in ctx.store.effective_selected_ids() {
            if ctx.store.is_locked(id) {
                continue;
            }
            let Some(component) = ctx.store.component(id) else {
                continue;
            };
            snapshot.move_offsets.insert(id, world - component.origin());
            snapshot.originals.insert(id, component.geometry());
        }
        if snapshot.move_offsets.is_empty() {
            log::debug!("Selection has nothing movable");
            return;
        }
        self.snapshot = Some(snapshot);
        self.cursor = CursorHint::Move;
        self.set_action(ActionState::Moving);
    }

    fn apply_move(&mut self, ctx: &mut InteractionContext<'_>, world: Point) {
        let Some(snapshot) = &self.snapshot else {
            log::error!("Moving without a snapshot");
            return;
        };
        for (&id, &offset) in &snapshot.move_offsets {
            let patch = ComponentPatch::position(world - offset);
            if let Err(err) = ctx.store.update_component(id, patch) {
                log::debug!("Skipping move: {err}");
            }
        }
    }

    fn apply_resize(&mut self, ctx: &mut InteractionContext<'_>, world: Point, keep_aspect: bool) {
        let Some((id, original, handle, start)) = self.single_target() else {
            log::error!("Resizing without a snapshot");
            return;
        };
        let Some(handle) = handle else {
            return;
        };
        let geometry = resize_geometry(&original, handle, start, world, keep_aspect);
        self.commit_transform(ctx, id, &original, geometry);
    }

    fn apply_rotate(&mut self, ctx: &mut InteractionContext<'_>, world: Point, snap: bool) {
        let Some((id, original, _, start)) = self.single_target() else {
            log::error!("Rotating without a snapshot");
            return;
        };
        let rotation = rotate_geometry(&original, start, world, snap);
        self.commit_transform(ctx, id, &original, Geometry { rotation, ..original });
    }

    /// Write the target's new geometry and carry snapshotted group members along.
    fn commit_transform(
        &self,
        ctx: &mut InteractionContext<'_>,
        target: ComponentId,
        original: &Geometry,
        updated: Geometry,
    ) {
        if let Err(err) = ctx.store.update_component(target, ComponentPatch::geometry(updated)) {
            log::debug!("Skipping transform: {err}");
            return;
        }
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        for (&id, member) in &snapshot.originals {
            if id == target {
                continue;
            }
            let geometry = follow_group(original, &updated, member);
            if let Err(err) = ctx.store.update_component(id, ComponentPatch::geometry(geometry)) {
                log::debug!("Skipping group member: {err}");
            }
        }
    }

    fn single_target(&self) -> Option<(ComponentId, Geometry, Option<HandleKind>, Point)> {
        let snapshot = self.snapshot.as_ref()?;
        let id = snapshot.target?;
        let original = *snapshot.originals.get(&id)?;
        Some((id, original, snapshot.handle, snapshot.start))
    }
}

/// Clicking a group member selects its group.
fn selection_target(store: &dyn ModelStore, id: ComponentId) -> ComponentId {
    store
        .component(id)
        .and_then(|c| c.group_id)
        .filter(|group| store.component(*group).is_some())
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentKind, ComponentSpec};
    use crate::handles::handle_position;
    use crate::haptics::RecordingHaptics;
    use crate::input::Modifiers;
    use crate::library::{Library, LibraryTemplate};
    use crate::store::MemoryStore;
    use kurbo::{Rect, Size};

    struct Harness {
        store: MemoryStore,
        surface: CanvasSurface,
        haptics: RecordingHaptics,
        engine: InteractionEngine,
    }

    impl Harness {
        fn new() -> Self {
            let mut surface = CanvasSurface::new();
            surface.mount(Point::ZERO, Size::new(800.0, 600.0), 1.0);
            Self {
                store: MemoryStore::new(),
                surface,
                haptics: RecordingHaptics::new(),
                engine: InteractionEngine::new(),
            }
        }

        fn add(&mut self, x: f64, y: f64, w: f64, h: f64) -> ComponentId {
            self.store.add_component(ComponentSpec::new(
                ComponentKind::Rectangle,
                Rect::new(x, y, x + w, y + h),
            ))
        }

        fn down(&mut self, input: PointerInput) {
            let mut ctx = InteractionContext::new(&mut self.store, &self.surface, &self.haptics);
            self.engine.pointer_down(&mut ctx, input);
        }

        fn moved(&mut self, input: PointerInput) {
            let mut ctx = InteractionContext::new(&mut self.store, &self.surface, &self.haptics);
            self.engine.pointer_move(&mut ctx, input);
        }

        fn up(&mut self, input: PointerInput) {
            let mut ctx = InteractionContext::new(&mut self.store, &self.surface, &self.haptics);
            self.engine.pointer_up(&mut ctx, input);
        }

        fn release(&mut self) {
            let mut ctx = InteractionContext::new(&mut self.store, &self.surface, &self.haptics);
            self.engine.release(&mut ctx);
        }

        fn wheel(&mut self, position: Point, delta: Vec2, modifiers: Modifiers) {
            let mut ctx = InteractionContext::new(&mut self.store, &self.surface, &self.haptics);
            self.engine.wheel(
                &mut ctx,
                WheelInput {
                    position,
                    delta,
                    modifiers,
                },
            );
        }

        fn drag(&mut self, from: Point, to: Point, modifiers: Modifiers) {
            self.down(PointerInput::mouse(from).with_modifiers(modifiers));
            self.moved(PointerInput::mouse(to).with_modifiers(modifiers));
            self.up(PointerInput::mouse(to).with_modifiers(modifiers));
        }

        fn geometry(&self, id: ComponentId) -> Geometry {
            self.store.component(id).unwrap().geometry()
        }
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_draw_rectangle_commits_component() {
        let mut h = Harness::new();
        h.store.set_tool(Tool::Rectangle);
        h.down(PointerInput::mouse(p(10.0, 10.0)));
        assert_eq!(h.engine.action(), ActionState::Drawing);
        h.moved(PointerInput::mouse(p(110.0, 60.0)));
        assert!(h.engine.drawing().current_shape().is_some());
        h.up(PointerInput::mouse(p(110.0, 60.0)));

        assert_eq!(h.engine.action(), ActionState::None);
        assert_eq!(h.store.components().len(), 1);
        let c = &h.store.components()[0];
        assert_eq!(c.kind, ComponentKind::Rectangle);
        assert!((c.x - 10.0).abs() < f64::EPSILON);
        assert!((c.y - 10.0).abs() < f64::EPSILON);
        assert!((c.width - 100.0).abs() < f64::EPSILON);
        assert!((c.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(h.store.selected_ids(), &[c.id]);
        assert!(h.engine.drawing().current_shape().is_none());
    }

    #[test]
    fn test_draw_shape_in_reverse_direction() {
        let mut h = Harness::new();
        h.store.set_tool(Tool::Circle);
        h.drag(p(200.0, 200.0), p(150.0, 120.0), Modifiers::NONE);
        let c = &h.store.components()[0];
        assert!((c.x - 150.0).abs() < f64::EPSILON);
        assert!((c.y - 120.0).abs() < f64::EPSILON);
        assert!((c.width - 50.0).abs() < f64::EPSILON);
        assert!((c.height - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_draw_respects_camera() {
        let mut h = Harness::new();
        h.store.set_view_transform(ViewTransform::new(2.0, Vec2::new(100.0, 0.0)));
        h.store.set_tool(Tool::Button);
        h.drag(p(100.0, 0.0), p(300.0, 80.0), Modifiers::NONE);
        let c = &h.store.components()[0];
        assert!((c.x - 0.0).abs() < f64::EPSILON);
        assert!((c.width - 100.0).abs() < f64::EPSILON);
        assert!((c.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pen_stroke() {
        let mut h = Harness::new();
        h.store.set_tool(Tool::Pen);
        h.down(PointerInput::mouse(p(0.0, 0.0)));
        h.moved(PointerInput::mouse(p(5.0, 5.0)));
        h.moved(PointerInput::mouse(p(10.0, 0.0)));
        h.up(PointerInput::mouse(p(10.0, 0.0)));
        assert_eq!(h.engine.drawing().drawn_paths().len(), 1);
        assert_eq!(h.engine.drawing().drawn_paths()[0].len(), 3);
        assert!(h.store.components().is_empty());
        // Moves after release do not extend the finished stroke
        h.moved(PointerInput::mouse(p(20.0, 20.0)));
        assert_eq!(h.engine.drawing().drawn_paths()[0].len(), 3);
    }

    #[test]
    fn test_resize_bottom_right_handle() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.store.select_component(Some(id), SelectMode::Replace);

        h.down(PointerInput::mouse(p(100.0, 100.0)));
        assert_eq!(h.engine.action(), ActionState::Resizing);
        assert_eq!(h.engine.active_handle(), Some(HandleKind::BottomRight));
        h.moved(PointerInput::mouse(p(120.0, 110.0)));
        h.up(PointerInput::mouse(p(120.0, 110.0)));

        let g = h.geometry(id);
        assert!((g.x - 0.0).abs() < 1e-9);
        assert!((g.y - 0.0).abs() < 1e-9);
        assert!((g.width - 120.0).abs() < 1e-9);
        assert!((g.height - 110.0).abs() < 1e-9);
        assert_eq!(h.engine.action(), ActionState::None);
    }

    #[test]
    fn test_resize_rotated_keeps_opposite_corner() {
        let mut h = Harness::new();
        let id = h.add(200.0, 200.0, 100.0, 60.0);
        h.store
            .update_component(id, ComponentPatch::rotation(30.0))
            .unwrap();
        h.store.select_component(Some(id), SelectMode::Replace);

        let metrics = HandleMetrics::new(false, 1.0);
        let before = h.geometry(id);
        let start = handle_position(&before, HandleKind::BottomRight, &metrics);
        let anchor = handle_position(&before, HandleKind::TopLeft, &metrics);

        h.down(PointerInput::mouse(start));
        assert_eq!(h.engine.action(), ActionState::Resizing);
        h.moved(PointerInput::mouse(start + Vec2::new(25.0, 15.0)));
        h.moved(PointerInput::mouse(start + Vec2::new(40.0, 30.0)));
        h.up(PointerInput::mouse(start + Vec2::new(40.0, 30.0)));

        let after = h.geometry(id);
        let moved_anchor = handle_position(&after, HandleKind::TopLeft, &metrics);
        assert!((anchor - moved_anchor).hypot() < 1e-6);
        assert!((after.rotation - 30.0).abs() < 1e-9);
        assert!(after.width > before.width);
    }

    #[test]
    fn test_rotate_with_shift_snaps() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.store.select_component(Some(id), SelectMode::Replace);

        h.down(PointerInput::mouse(p(50.0, -20.0)));
        assert_eq!(h.engine.action(), ActionState::Rotating);
        for target in [p(150.0, 30.0), p(140.0, 90.0), p(20.0, 160.0)] {
            h.moved(PointerInput::mouse(target).with_modifiers(Modifiers::shift()));
            let r = h.geometry(id).rotation;
            assert!(((r / 15.0) - (r / 15.0).round()).abs() < 1e-9, "{r}");
        }
        h.up(PointerInput::mouse(p(20.0, 160.0)));
        assert_eq!(h.engine.action(), ActionState::None);
    }

    #[test]
    fn test_handle_beats_unselected_body_on_top() {
        let mut h = Harness::new();
        let below = h.add(0.0, 0.0, 100.0, 100.0);
        let above = h.add(95.0, 95.0, 50.0, 50.0);
        h.store.select_component(Some(below), SelectMode::Replace);

        h.down(PointerInput::mouse(p(100.0, 100.0)));
        assert_eq!(h.engine.action(), ActionState::Resizing);
        assert_eq!(h.engine.active_target(), Some(below));
        assert_eq!(h.store.selected_ids(), &[below]);
        h.release();
        assert!(h.store.component(above).is_some());
    }

    #[test]
    fn test_click_selects_and_moves() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.drag(p(50.0, 50.0), p(80.0, 70.0), Modifiers::NONE);
        assert_eq!(h.store.selected_ids(), &[id]);
        let g = h.geometry(id);
        assert!((g.x - 30.0).abs() < 1e-9);
        assert!((g.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_whole_selection() {
        let mut h = Harness::new();
        let a = h.add(0.0, 0.0, 50.0, 50.0);
        let b = h.add(100.0, 0.0, 50.0, 50.0);
        h.store.select_component(Some(a), SelectMode::Replace);
        h.store.select_component(Some(b), SelectMode::Add);

        h.drag(p(25.0, 25.0), p(35.0, 45.0), Modifiers::NONE);
        assert!((h.geometry(a).x - 10.0).abs() < 1e-9);
        assert!((h.geometry(b).x - 110.0).abs() < 1e-9);
        assert!((h.geometry(b).y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_shift_click_toggles_without_moving() {
        let mut h = Harness::new();
        let a = h.add(0.0, 0.0, 50.0, 50.0);
        let b = h.add(100.0, 0.0, 50.0, 50.0);
        h.store.select_component(Some(a), SelectMode::Replace);

        h.down(PointerInput::mouse(p(120.0, 20.0)).with_modifiers(Modifiers::shift()));
        h.up(PointerInput::mouse(p(120.0, 20.0)));
        assert_eq!(h.store.selected_ids(), &[a, b]);

        h.down(PointerInput::mouse(p(20.0, 20.0)).with_modifiers(Modifiers::shift()));
        assert_eq!(h.engine.action(), ActionState::None);
        h.moved(PointerInput::mouse(p(60.0, 60.0)));
        h.up(PointerInput::mouse(p(60.0, 60.0)));
        assert_eq!(h.store.selected_ids(), &[b]);
        assert!((h.geometry(a).x - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_click_empty_clears_selection() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 50.0, 50.0);
        h.store.select_component(Some(id), SelectMode::Replace);
        h.down(PointerInput::mouse(p(400.0, 400.0)).with_modifiers(Modifiers::shift()));
        assert_eq!(h.store.selected_ids(), &[id]);
        h.down(PointerInput::mouse(p(400.0, 400.0)));
        assert!(h.store.selected_ids().is_empty());
        assert_eq!(h.engine.action(), ActionState::None);
    }

    #[test]
    fn test_locked_component_selects_but_never_moves() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.store
            .update_component(
                id,
                ComponentPatch {
                    is_locked: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        h.down(PointerInput::mouse(p(50.0, 50.0)));
        assert_eq!(h.store.selected_ids(), &[id]);
        assert_eq!(h.engine.action(), ActionState::None);
        h.moved(PointerInput::mouse(p(90.0, 90.0)));
        h.up(PointerInput::mouse(p(90.0, 90.0)));
        assert!((h.geometry(id).x - 0.0).abs() < f64::EPSILON);

        // No handles on a locked component
        h.down(PointerInput::mouse(p(50.0, -20.0)));
        assert_eq!(h.engine.action(), ActionState::None);
    }

    #[test]
    fn test_release_anywhere_prevents_stuck_state() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.down(PointerInput::mouse(p(50.0, 50.0)));
        h.moved(PointerInput::mouse(p(60.0, 50.0)));
        assert_eq!(h.engine.action(), ActionState::Moving);

        // Released outside the surface
        h.up(PointerInput::mouse(p(-5000.0, 9000.0)));
        assert_eq!(h.engine.action(), ActionState::None);
        h.moved(PointerInput::mouse(p(300.0, 300.0)));
        assert!((h.geometry(id).x - 10.0).abs() < 1e-9);

        h.store.set_tool(Tool::Rectangle);
        h.down(PointerInput::mouse(p(0.0, 0.0)));
        h.release();
        assert_eq!(h.engine.action(), ActionState::None);
    }

    #[test]
    fn test_stale_target_is_ignored() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.down(PointerInput::mouse(p(50.0, 50.0)));
        assert_eq!(h.engine.action(), ActionState::Moving);
        h.store.remove(id);
        h.moved(PointerInput::mouse(p(70.0, 70.0)));
        h.up(PointerInput::mouse(p(70.0, 70.0)));
        assert_eq!(h.engine.action(), ActionState::None);
        assert!(h.store.components().is_empty());
    }

    #[test]
    fn test_middle_button_pans() {
        let mut h = Harness::new();
        h.down(PointerInput::mouse(p(100.0, 100.0)).with_button(PointerButton::Middle));
        assert_eq!(h.engine.action(), ActionState::Panning);
        h.moved(PointerInput::mouse(p(130.0, 90.0)));
        h.moved(PointerInput::mouse(p(140.0, 80.0)));
        h.up(PointerInput::mouse(p(140.0, 80.0)));
        assert_eq!(h.store.camera().pan, Vec2::new(40.0, -20.0));
    }

    #[test]
    fn test_command_drag_pans_even_with_drawing_tool() {
        let mut h = Harness::new();
        h.store.set_tool(Tool::Rectangle);
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        h.drag(p(0.0, 0.0), p(15.0, 5.0), cmd);
        assert_eq!(h.store.camera().pan, Vec2::new(15.0, 5.0));
        assert!(h.store.components().is_empty());
    }

    #[test]
    fn test_wheel_zooms_about_cursor() {
        let mut h = Harness::new();
        let anchor = p(200.0, 150.0);
        let before = h.store.camera().canvas_to_world(anchor);
        h.wheel(anchor, Vec2::new(0.0, -120.0), Modifiers::NONE);
        let camera = h.store.camera();
        assert!((camera.zoom - WHEEL_ZOOM_STEP).abs() < 1e-12);
        assert!((camera.canvas_to_world(anchor) - before).hypot() < 1e-9);

        for _ in 0..100 {
            h.wheel(anchor, Vec2::new(0.0, 120.0), Modifiers::NONE);
        }
        assert!((h.store.camera().zoom - crate::camera::MIN_ZOOM).abs() < 1e-12);
    }

    #[test]
    fn test_shift_wheel_pans() {
        let mut h = Harness::new();
        h.wheel(p(0.0, 0.0), Vec2::new(0.0, 30.0), Modifiers::shift());
        assert_eq!(h.store.camera().pan, Vec2::new(0.0, -30.0));
        assert!((h.store.camera().zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hover_cursor() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.moved(PointerInput::mouse(p(50.0, 50.0)));
        assert_eq!(h.engine.cursor(), CursorHint::Move);
        h.store.select_component(Some(id), SelectMode::Replace);
        h.moved(PointerInput::mouse(p(100.0, 50.0)));
        assert_eq!(h.engine.cursor(), CursorHint::EwResize);
        h.moved(PointerInput::mouse(p(50.0, -20.0)));
        assert_eq!(h.engine.cursor(), CursorHint::Grab);
        h.moved(PointerInput::mouse(p(500.0, 500.0)));
        assert_eq!(h.engine.cursor(), CursorHint::Default);
        h.store.set_tool(Tool::Pen);
        h.moved(PointerInput::mouse(p(50.0, 50.0)));
        assert_eq!(h.engine.cursor(), CursorHint::Crosshair);
    }

    fn pair_library() -> Library {
        let mut library = Library::new();
        library.insert(
            "pair",
            LibraryTemplate {
                name: "Pair".into(),
                width: 60.0,
                height: 20.0,
                components: vec![
                    ComponentSpec::new(ComponentKind::Button, Rect::new(0.0, 0.0, 20.0, 20.0)),
                    ComponentSpec::new(ComponentKind::Input, Rect::new(40.0, 0.0, 60.0, 20.0)),
                ],
            },
        );
        library
    }

    #[test]
    fn test_drop_centers_template() {
        let mut h = Harness::new();
        h.store = MemoryStore::new().with_library(pair_library());
        let payload = DropPayload::new("pair");
        assert!(h.engine.drag_over(Some(&payload)));
        assert!(!h.engine.drag_over(None));

        let mut ctx = InteractionContext::new(&mut h.store, &h.surface, &h.haptics);
        let id = h.engine.handle_drop(&mut ctx, p(300.0, 300.0), &payload).unwrap();
        let group = h.store.component(id).unwrap();
        assert!((group.x - 270.0).abs() < f64::EPSILON);
        assert!((group.y - 290.0).abs() < f64::EPSILON);

        let mut ctx = InteractionContext::new(&mut h.store, &h.surface, &h.haptics);
        assert!(h.engine.handle_drop(&mut ctx, p(0.0, 0.0), &DropPayload::new("nope")).is_none());
    }

    #[test]
    fn test_clicking_group_member_moves_group() {
        let mut h = Harness::new();
        h.store = MemoryStore::new().with_library(pair_library());
        let group = h.store.add_library_component("pair", p(0.0, 0.0)).unwrap();
        h.store.select_component(None, SelectMode::Replace);

        // The group box sits above its members
        h.drag(p(10.0, 10.0), p(20.0, 30.0), Modifiers::NONE);
        assert_eq!(h.store.selected_ids(), &[group]);
        for c in h.store.components() {
            assert!((c.y - 20.0).abs() < 1e-9, "{:?} did not move", c.kind);
        }
    }

    fn dropped_pair(h: &mut Harness) -> (ComponentId, Vec<ComponentId>) {
        h.store = MemoryStore::new().with_library(pair_library());
        let group = h.store.add_library_component("pair", p(0.0, 0.0)).unwrap();
        let members = h.store.component(group).unwrap().child_ids.clone();
        (group, members)
    }

    #[test]
    fn test_locked_group_members_cannot_be_resized() {
        let mut h = Harness::new();
        let (group, members) = dropped_pair(&mut h);
        let lock = ComponentPatch {
            is_locked: Some(true),
            ..Default::default()
        };
        h.store.update_component(group, lock).unwrap();
        assert_eq!(h.store.selected_ids(), &[group]);

        // Bottom-right corner of the first member
        h.moved(PointerInput::mouse(p(20.0, 20.0)));
        assert_eq!(h.engine.cursor(), CursorHint::Default);
        h.down(PointerInput::mouse(p(20.0, 20.0)));
        assert_eq!(h.engine.action(), ActionState::None);
        h.moved(PointerInput::mouse(p(80.0, 60.0)));
        h.up(PointerInput::mouse(p(80.0, 60.0)));

        let member = h.geometry(members[0]);
        assert!((member.width - 20.0).abs() < f64::EPSILON);
        assert!((member.x - 0.0).abs() < f64::EPSILON);
        assert!((h.geometry(group).width - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resizing_group_scales_members() {
        let mut h = Harness::new();
        let (group, members) = dropped_pair(&mut h);

        h.down(PointerInput::mouse(p(60.0, 20.0)));
        assert_eq!(h.engine.action(), ActionState::Resizing);
        assert_eq!(h.engine.active_target(), Some(group));
        h.moved(PointerInput::mouse(p(120.0, 40.0)));
        h.up(PointerInput::mouse(p(120.0, 40.0)));

        let g = h.geometry(group);
        assert!((g.width - 120.0).abs() < 1e-9);
        assert!((g.height - 40.0).abs() < 1e-9);
        let first = h.geometry(members[0]);
        assert!((first.x - 0.0).abs() < 1e-9);
        assert!((first.width - 40.0).abs() < 1e-9);
        let second = h.geometry(members[1]);
        assert!((second.x - 80.0).abs() < 1e-9);
        assert!((second.y - 0.0).abs() < 1e-9);
        assert!((second.height - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotating_group_turns_members() {
        let mut h = Harness::new();
        let (group, members) = dropped_pair(&mut h);
        let center = h.geometry(group).center();
        let before = h.geometry(members[0]).center();

        h.down(PointerInput::mouse(p(30.0, -20.0)));
        assert_eq!(h.engine.action(), ActionState::Rotating);
        assert_eq!(h.engine.active_target(), Some(group));
        h.moved(PointerInput::mouse(p(60.0, 10.0)));
        h.up(PointerInput::mouse(p(60.0, 10.0)));

        assert!((h.geometry(group).rotation - 90.0).abs() < 1e-9);
        for &member in &members {
            assert!((h.geometry(member).rotation - 90.0).abs() < 1e-9);
        }
        let expected = crate::geometry::rotate_point(before, center, 90.0);
        assert!((h.geometry(members[0]).center() - expected).hypot() < 1e-9);
        assert!((expected - p(30.0, -10.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_drawn_shape_keeps_colors_across_theme_change() {
        let mut h = Harness::new();
        h.store.set_theme(crate::theme::Theme::dark());
        h.store.set_tool(Tool::Rectangle);
        h.drag(p(10.0, 10.0), p(90.0, 70.0), Modifiers::NONE);
        let id = h.store.components()[0].id;

        h.store.set_theme(crate::theme::Theme::light());
        let c = h.store.component(id).unwrap();
        let style = crate::theme::ResolvedStyle::resolve(c, h.store.theme());
        assert_eq!(style.background, crate::theme::Theme::dark().surface);
        assert_eq!(style.border, crate::theme::Theme::dark().border);
    }

    #[test]
    fn test_touch_haptics() {
        let mut h = Harness::new();
        h.store.set_mobile_mode(true);
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.down(PointerInput::touch(p(50.0, 50.0)));
        h.up(PointerInput::touch(p(50.0, 50.0)));
        assert_eq!(h.store.selected_ids(), &[id]);
        assert_eq!(h.haptics.take(), vec![HapticKind::Selection]);

        h.store.set_tool(Tool::Rectangle);
        h.drag(p(200.0, 200.0), p(260.0, 240.0), Modifiers::NONE);
        assert_eq!(h.haptics.take(), vec![HapticKind::Impact]);
    }

    #[test]
    fn test_touch_mode_uses_larger_handles() {
        let mut h = Harness::new();
        let id = h.add(0.0, 0.0, 100.0, 100.0);
        h.store.select_component(Some(id), SelectMode::Replace);
        h.down(PointerInput::touch(p(118.0, 118.0)));
        assert_eq!(h.engine.action(), ActionState::Resizing);
        h.release();
        h.down(PointerInput::mouse(p(118.0, 118.0)));
        assert_eq!(h.engine.action(), ActionState::None);
    }

    #[test]
    fn test_repaint_requested_on_change() {
        let mut h = Harness::new();
        h.surface.take_repaint_request();
        h.moved(PointerInput::mouse(p(10.0, 10.0)));
        assert!(!h.surface.take_repaint_request());
        h.store.set_tool(Tool::Pen);
        h.down(PointerInput::mouse(p(10.0, 10.0)));
        assert!(h.surface.take_repaint_request());
    }
}
