//! JSON event scripts.
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "tool": "rectangle",
//!   "events": [
//!     { "type": "pointer_down", "x": 100, "y": 100 },
//!     { "type": "pointer_move", "x": 220, "y": 180 },
//!     { "type": "pointer_up", "x": 220, "y": 180 }
//!   ]
//! }
//! ```

use kurbo::{Point, Size, Vec2};
use serde::Deserialize;
use wirecanvas_core::{
    DrawingSettings, DropPayload, Library, Modifiers, PointerButton, PointerInput, PointerKind, ThemeMode,
    Tool, TouchPoint, WheelInput,
};

/// Canvas placement and size in client coordinates.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
            scale_factor: 1.0,
        }
    }
}

impl Viewport {
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A complete replay: initial configuration followed by events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Script {
    pub viewport: Viewport,
    pub theme: ThemeMode,
    pub mobile: bool,
    pub tool: Tool,
    pub drawing: DrawingSettings,
    pub library: Library,
    pub events: Vec<ScriptEvent>,
}

/// Pointer event fields shared by down/move/up.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub button: PointerButton,
    #[serde(default)]
    pub pointer: PointerKind,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn input(&self) -> PointerInput {
        PointerInput {
            position: Point::new(self.x, self.y),
            button: self.button,
            modifiers: self.modifiers,
            kind: self.pointer,
        }
    }
}

/// One recorded input event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// Pointer released outside the canvas.
    Release,
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    TouchStart {
        touches: Vec<TouchPoint>,
        time: f64,
    },
    TouchMove {
        touches: Vec<TouchPoint>,
        time: f64,
    },
    /// `touches` lists the contacts still down.
    TouchEnd {
        #[serde(default)]
        touches: Vec<TouchPoint>,
    },
    TouchCancel,
    /// Animation frame callback.
    Frame {
        time: f64,
    },
    SetTool {
        tool: Tool,
    },
    Resize {
        width: f64,
        height: f64,
    },
    Drop {
        x: f64,
        y: f64,
        template: String,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
}

impl ScriptEvent {
    pub fn wheel_input(x: f64, y: f64, dx: f64, dy: f64, modifiers: Modifiers) -> WheelInput {
        WheelInput {
            position: Point::new(x, y),
            delta: Vec2::new(dx, dy),
            modifiers,
        }
    }

    pub fn drop_payload(template: &str, width: Option<f64>, height: Option<f64>) -> DropPayload {
        let payload = DropPayload::new(template);
        match (width, height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => payload.with_size(Size::new(w, h)),
            _ => payload,
        }
    }
}
