//! Touch gesture recognition: single-finger forwarding and two-finger pinch.
//!
//! Pinch updates are not applied to the store immediately. Each accepted
//! touch move overwrites a pending view transform, and
//! [`GestureRecognizer::on_animation_frame`] applies it at most once per
//! throttle window, so the newest finger position always wins.

use kurbo::{Point, Vec2};

use crate::camera::clamp_zoom;
use crate::input::{PointerInput, TouchPoint};
use crate::interaction::{InteractionContext, InteractionEngine};
use crate::store::ViewTransform;

/// Tunable thresholds for pinch recognition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Minimum time between applied view updates.
    pub throttle_ms: f64,
    /// Finger distances below this are too noisy to scale from.
    pub min_distance: f64,
    /// Accepted range for `distance / initial_distance`.
    pub min_ratio: f64,
    pub max_ratio: f64,
    /// Updates this soon after the pinch began are ignored.
    pub settle_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 16.0,
            min_distance: 20.0,
            min_ratio: 0.1,
            max_ratio: 10.0,
            settle_ms: 50.0,
        }
    }
}

/// View state captured when two fingers land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchSnapshot {
    pub initial_distance: f64,
    pub initial_zoom: f64,
    pub initial_pan: Vec2,
    /// Finger midpoint in canvas coordinates.
    pub initial_center: Point,
    pub start_time: f64,
}

impl PinchSnapshot {
    /// View transform for the current finger distance and midpoint.
    ///
    /// The world point under the initial midpoint stays under it while
    /// zooming, then the view follows the midpoint's drift.
    pub fn transform_for(&self, distance: f64, center: Point) -> ViewTransform {
        let ratio = distance / self.initial_distance;
        let zoom = clamp_zoom(self.initial_zoom * ratio);
        let scale = zoom / self.initial_zoom;
        let c0 = self.initial_center.to_vec2();
        let drift = center - self.initial_center;
        let pan = c0 - (c0 - self.initial_pan) * scale + drift;
        ViewTransform::new(zoom, pan)
    }
}

/// Why a pinch update was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchRejection {
    TooClose,
    RatioOutOfRange,
    Settling,
}

/// Result of a touch move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchMoveOutcome {
    /// Nothing to do (no gesture in progress).
    Ignored,
    /// Forwarded to the interaction engine as a pointer move.
    Forwarded,
    /// Pinch update stored as the pending transform.
    Pending(ViewTransform),
    Rejected(PinchRejection),
}

/// Recognizes touch gestures and feeds them to the engine and store.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    pinch: Option<PinchSnapshot>,
    pending: Option<ViewTransform>,
    last_applied: Option<f64>,
    single_touch: bool,
    // A pinch ended with a finger still down; ignore it until it lifts.
    wait_for_lift: bool,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn pinch(&self) -> Option<&PinchSnapshot> {
        self.pinch.as_ref()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn pending(&self) -> Option<ViewTransform> {
        self.pending
    }

    /// Contacts changed: `touches` holds every finger now down.
    pub fn touch_start(
        &mut self,
        engine: &mut InteractionEngine,
        ctx: &mut InteractionContext<'_>,
        touches: &[TouchPoint],
        timestamp: f64,
    ) {
        match touches {
            [a, b, ..] => {
                if self.pinch.is_some() {
                    return;
                }
                // A second finger aborts whatever the first one started
                engine.cancel(ctx);
                self.single_touch = false;

                let camera = ctx.store.camera();
                let center = midpoint(a.position(), b.position());
                self.pinch = Some(PinchSnapshot {
                    initial_distance: a.position().distance(b.position()),
                    initial_zoom: camera.zoom,
                    initial_pan: camera.pan,
                    initial_center: ctx.surface.screen_to_canvas(center),
                    start_time: timestamp,
                });
                self.pending = None;
                log::debug!("Pinch started at zoom {:.2}", camera.zoom);
            }
            [touch] => {
                if self.pinch.is_some() || self.wait_for_lift {
                    return;
                }
                self.single_touch = true;
                engine.pointer_down(ctx, PointerInput::touch(touch.position()));
            }
            [] => {}
        }
    }

    pub fn touch_move(
        &mut self,
        engine: &mut InteractionEngine,
        ctx: &mut InteractionContext<'_>,
        touches: &[TouchPoint],
        timestamp: f64,
    ) -> TouchMoveOutcome {
        if let Some(pinch) = self.pinch {
            let [a, b, ..] = touches else {
                return TouchMoveOutcome::Ignored;
            };
            return match self.evaluate(&pinch, ctx, a, b, timestamp) {
                Ok(transform) => {
                    self.pending = Some(transform);
                    TouchMoveOutcome::Pending(transform)
                }
                Err(reason) => {
                    log::trace!("Pinch update dropped: {reason:?}");
                    TouchMoveOutcome::Rejected(reason)
                }
            };
        }
        match touches {
            [touch] if self.single_touch => {
                engine.pointer_move(ctx, PointerInput::touch(touch.position()));
                TouchMoveOutcome::Forwarded
            }
            _ => TouchMoveOutcome::Ignored,
        }
    }

    /// Contacts lifted: `remaining` holds the fingers still down.
    pub fn touch_end(
        &mut self,
        engine: &mut InteractionEngine,
        ctx: &mut InteractionContext<'_>,
        remaining: &[TouchPoint],
    ) {
        if self.pinch.is_some() {
            if remaining.len() < 2 {
                // The last accepted update stays pending and lands on the next frame
                self.pinch = None;
                self.wait_for_lift = !remaining.is_empty();
                log::debug!("Pinch ended");
            }
        } else if self.single_touch && remaining.is_empty() {
            self.single_touch = false;
            engine.release(ctx);
        }
        if remaining.is_empty() {
            self.wait_for_lift = false;
        }
    }

    /// Touch cancelled by the platform; ends every gesture.
    pub fn touch_cancel(&mut self, engine: &mut InteractionEngine, ctx: &mut InteractionContext<'_>) {
        self.pinch = None;
        self.wait_for_lift = false;
        if self.single_touch {
            self.single_touch = false;
            engine.release(ctx);
        }
    }

    /// Apply the pending view transform if the throttle window has passed.
    /// Returns whether the store was updated.
    pub fn on_animation_frame(&mut self, ctx: &mut InteractionContext<'_>, now: f64) -> bool {
        if self.pending.is_none() {
            return false;
        }
        if let Some(last) = self.last_applied {
            if now - last < self.config.throttle_ms {
                return false;
            }
        }
        let Some(transform) = self.pending.take() else {
            return false;
        };
        ctx.store.set_view_transform(transform);
        ctx.surface.request_repaint();
        self.last_applied = Some(now);
        true
    }

    fn evaluate(
        &self,
        pinch: &PinchSnapshot,
        ctx: &InteractionContext<'_>,
        a: &TouchPoint,
        b: &TouchPoint,
        timestamp: f64,
    ) -> Result<ViewTransform, PinchRejection> {
        let distance = a.position().distance(b.position());
        if distance < self.config.min_distance || pinch.initial_distance < self.config.min_distance {
            return Err(PinchRejection::TooClose);
        }
        let ratio = distance / pinch.initial_distance;
        if !(self.config.min_ratio..=self.config.max_ratio).contains(&ratio) {
            return Err(PinchRejection::RatioOutOfRange);
        }
        if timestamp - pinch.start_time < self.config.settle_ms {
            return Err(PinchRejection::Settling);
        }
        let center = ctx
            .surface
            .screen_to_canvas(midpoint(a.position(), b.position()));
        Ok(pinch.transform_for(distance, center))
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}
