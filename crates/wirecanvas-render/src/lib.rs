//! WireCanvas Render Library
//!
//! Renderer abstraction and implementations for WireCanvas.
//! The default implementation uses Vello for GPU-accelerated rendering.

pub mod image_cache;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use image_cache::{DataUrlLoader, DefaultLoader, ImageCache, ImageError, ImageLoader, ImageSink, ImageStatus};
pub use renderer::{
    GRID_SIZE, GridStyle, MAX_GRID_LINES, RenderContext, RenderResult, Renderer, RendererError, grid_lines,
};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
