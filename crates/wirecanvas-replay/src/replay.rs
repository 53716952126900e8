//! Drives the engine, gesture recognizer and renderer from a script.

use kurbo::Point;
use serde::Serialize;
use wirecanvas_core::haptics::{HapticKind, RecordingHaptics};
use wirecanvas_core::{
    ActionState, CanvasSurface, GestureRecognizer, InteractionContext, InteractionEngine, MemoryStore, ModelStore,
    Theme, TouchMoveOutcome,
};
use wirecanvas_render::{RenderContext, Renderer, VelloRenderer};

use crate::script::{Script, ScriptEvent};

/// Result of a replay, printed as JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport<'a> {
    pub document: &'a MemoryStore,
    pub frames_rendered: usize,
    pub rejected_pinch_updates: usize,
    pub selection_pulses: usize,
    pub impact_pulses: usize,
    pub cursor: &'static str,
    pub idle: bool,
}

/// Headless host: owns everything a browser page would.
pub struct Replay {
    store: MemoryStore,
    surface: CanvasSurface,
    engine: InteractionEngine,
    gestures: GestureRecognizer,
    haptics: RecordingHaptics,
    renderer: VelloRenderer,
    frames_rendered: usize,
    rejected_pinch_updates: usize,
    pulses: Vec<HapticKind>,
}

impl Replay {
    pub fn new(script: &Script) -> Self {
        let mut store = MemoryStore::new()
            .with_library(script.library.clone())
            .with_theme(Theme::for_mode(script.theme));
        store.set_mobile_mode(script.mobile);
        store.set_drawing_settings(script.drawing);
        store.set_tool(script.tool);

        let mut surface = CanvasSurface::new();
        let viewport = script.viewport;
        surface.mount(viewport.origin(), viewport.size(), viewport.scale_factor);

        let mut renderer = VelloRenderer::new();
        renderer.image_cache_mut().set_repaint_handle(surface.repaint_handle());

        Self {
            store,
            surface,
            engine: InteractionEngine::new(),
            gestures: GestureRecognizer::new(),
            haptics: RecordingHaptics::new(),
            renderer,
            frames_rendered: 0,
            rejected_pinch_updates: 0,
            pulses: Vec::new(),
        }
    }

    /// Replay every event of `script`, rendering whenever a repaint is requested.
    pub fn run(script: &Script) -> Self {
        let mut replay = Self::new(script);
        replay.render_if_requested();
        for event in &script.events {
            replay.apply(event);
            replay.render_if_requested();
        }
        replay
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }

    pub fn report(&self) -> ReplayReport<'_> {
        let count = |kind: HapticKind| self.pulses.iter().filter(|k| **k == kind).count();
        ReplayReport {
            document: &self.store,
            frames_rendered: self.frames_rendered,
            rejected_pinch_updates: self.rejected_pinch_updates,
            selection_pulses: count(HapticKind::Selection),
            impact_pulses: count(HapticKind::Impact),
            cursor: self.engine.cursor().css_name(),
            idle: self.engine.action() == ActionState::None,
        }
    }

    pub fn apply(&mut self, event: &ScriptEvent) {
        log::trace!("Replaying {event:?}");
        if let ScriptEvent::Resize { width, height } = event {
            self.surface.resize(kurbo::Size::new(*width, *height));
            return;
        }

        let mut ctx = InteractionContext::new(&mut self.store, &self.surface, &self.haptics);
        match event {
            ScriptEvent::PointerDown(e) => self.engine.pointer_down(&mut ctx, e.input()),
            ScriptEvent::PointerMove(e) => self.engine.pointer_move(&mut ctx, e.input()),
            ScriptEvent::PointerUp(e) => self.engine.pointer_up(&mut ctx, e.input()),
            ScriptEvent::Release => self.engine.release(&mut ctx),
            ScriptEvent::Wheel { x, y, dx, dy, modifiers } => {
                let input = ScriptEvent::wheel_input(*x, *y, *dx, *dy, *modifiers);
                self.engine.wheel(&mut ctx, input);
            }
            ScriptEvent::TouchStart { touches, time } => {
                self.gestures.touch_start(&mut self.engine, &mut ctx, touches, *time);
            }
            ScriptEvent::TouchMove { touches, time } => {
                let outcome = self.gestures.touch_move(&mut self.engine, &mut ctx, touches, *time);
                if let TouchMoveOutcome::Rejected(reason) = outcome {
                    log::debug!("Pinch update rejected: {reason:?}");
                    self.rejected_pinch_updates += 1;
                }
            }
            ScriptEvent::TouchEnd { touches } => {
                self.gestures.touch_end(&mut self.engine, &mut ctx, touches);
            }
            ScriptEvent::TouchCancel => self.gestures.touch_cancel(&mut self.engine, &mut ctx),
            ScriptEvent::Frame { time } => {
                self.gestures.on_animation_frame(&mut ctx, *time);
            }
            ScriptEvent::SetTool { tool } => {
                ctx.store.set_tool(*tool);
                ctx.surface.request_repaint();
            }
            ScriptEvent::Drop {
                x,
                y,
                template,
                width,
                height,
            } => {
                let payload = ScriptEvent::drop_payload(template, *width, *height);
                if self.engine.drag_over(Some(&payload)) {
                    let placed = self.engine.handle_drop(&mut ctx, Point::new(*x, *y), &payload);
                    if placed.is_none() {
                        log::warn!("Drop of '{template}' did not place a component");
                    }
                }
            }
            ScriptEvent::Resize { .. } => {}
        }
        self.pulses.extend(self.haptics.take());
    }

    /// Build a frame if anything asked for one since the last frame.
    fn render_if_requested(&mut self) {
        self.renderer.poll_images();
        if !self.surface.take_repaint_request() {
            return;
        }
        let ctx = RenderContext::capture(&self.store, &self.engine, &self.surface);
        self.renderer.build_scene(&ctx);
        self.frames_rendered += 1;
    }
}
