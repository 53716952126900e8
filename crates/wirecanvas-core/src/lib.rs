//! WireCanvas Core Library
//!
//! Platform-agnostic data model and interaction engine for the WireCanvas
//! wireframe editor: camera, surface lifecycle, handle geometry, hit-testing,
//! drawing tools, the pointer state machine and touch gestures.

pub mod camera;
pub mod color;
pub mod component;
pub mod drawing;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod handles;
pub mod haptics;
pub mod input;
pub mod interaction;
pub mod library;
pub mod manipulation;
pub mod store;
pub mod surface;
pub mod theme;

pub use camera::{Camera, MAX_ZOOM, MIN_ZOOM};
pub use color::Rgba;
pub use component::{
    Component, ComponentId, ComponentKind, ComponentPatch, ComponentProps, ComponentSpec, Geometry,
};
pub use drawing::{DrawingState, ShapePreview};
pub use error::{ColorError, LibraryError, StoreError};
pub use geometry::CursorHint;
pub use gesture::{GestureConfig, GestureRecognizer, PinchSnapshot, TouchMoveOutcome};
pub use handles::{Handle, HandleKind, HandleMetrics};
pub use haptics::{HapticKind, Haptics, NoHaptics};
pub use hit_test::{HitResult, resolve_action};
pub use input::{Modifiers, PointerButton, PointerInput, PointerKind, TouchPoint, WheelInput};
pub use interaction::{ActionState, InteractionContext, InteractionEngine};
pub use library::{DropPayload, Library, LibraryTemplate};
pub use store::{MemoryStore, ModelStore, SelectMode, Tool, ViewTransform};
pub use surface::{CanvasSurface, RepaintHandle};
pub use theme::{DrawingSettings, ResolvedStyle, Theme, ThemeMode};
