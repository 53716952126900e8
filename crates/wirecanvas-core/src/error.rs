//! Error types for the core crate.

use thiserror::Error;

use crate::component::ComponentId;

/// Errors raised by model store mutations.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Unknown component: {0}")]
    UnknownComponent(ComponentId),
    #[error("Unknown library template: {0}")]
    UnknownTemplate(String),
    #[error("Library template {0} has no components")]
    EmptyTemplate(String),
}

/// Errors raised while parsing colors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Color must start with '#': {0}")]
    MissingHash(String),
    #[error("Invalid hex digits in color: {0}")]
    InvalidHex(String),
    #[error("Color must have 3, 6 or 8 hex digits: {0}")]
    InvalidLength(String),
}

/// Errors raised while loading library templates.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Invalid library JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Template {key} has invalid size {width}x{height}")]
    InvalidSize { key: String, width: f64, height: f64 },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
