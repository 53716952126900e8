//! Library templates and drag-and-drop payloads.

use std::collections::HashMap;

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::component::ComponentSpec;
use crate::error::LibraryError;

/// Drag payload key carrying the template key.
pub const TEMPLATE_KEY: &str = "templateKey";
/// Drag payload key carrying the intrinsic width.
pub const WIDTH_KEY: &str = "width";
/// Drag payload key carrying the intrinsic height.
pub const HEIGHT_KEY: &str = "height";

/// A reusable group of components, positioned relative to the template origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTemplate {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub components: Vec<ComponentSpec>,
}

impl LibraryTemplate {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Component specs translated so the template origin lands on `origin`.
    pub fn instantiate(&self, origin: Point) -> Vec<ComponentSpec> {
        let offset = origin.to_vec2();
        self.components.iter().map(|c| c.translated(offset)).collect()
    }
}

/// Template registry keyed by template key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Library {
    templates: HashMap<String, LibraryTemplate>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `{ "key": template, ... }` JSON object.
    pub fn from_json(json: &str) -> Result<Self, LibraryError> {
        let library: Library = serde_json::from_str(json)?;
        for (key, template) in &library.templates {
            if !(template.width > 0.0 && template.height > 0.0) {
                return Err(LibraryError::InvalidSize {
                    key: key.clone(),
                    width: template.width,
                    height: template.height,
                });
            }
        }
        Ok(library)
    }

    pub fn insert(&mut self, key: impl Into<String>, template: LibraryTemplate) {
        self.templates.insert(key.into(), template);
    }

    pub fn get(&self, key: &str) -> Option<&LibraryTemplate> {
        self.templates.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Data carried by a library drag, parsed from the drag key/value bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct DropPayload {
    pub template_key: String,
    /// Intrinsic size advertised by the drag source, if any.
    pub size: Option<Size>,
}

impl DropPayload {
    pub fn new(template_key: impl Into<String>) -> Self {
        Self {
            template_key: template_key.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Parse from `(key, value)` pairs. Returns `None` without a template key.
    pub fn from_pairs<'a, I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut key = None;
        let mut width = None;
        let mut height = None;
        for (k, v) in pairs {
            match k {
                TEMPLATE_KEY => key = Some(v.trim().to_string()).filter(|s| !s.is_empty()),
                WIDTH_KEY => width = v.trim().parse::<f64>().ok(),
                HEIGHT_KEY => height = v.trim().parse::<f64>().ok(),
                _ => {}
            }
        }
        let size = match (width, height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some(Size::new(w, h)),
            _ => None,
        };
        key.map(|template_key| Self { template_key, size })
    }

    /// Top-left position that centers the payload on `world`.
    ///
    /// Falls back to the template's declared size when the drag carried none.
    pub fn placement(&self, world: Point, library_size: Option<Size>) -> Point {
        match self.size.or(library_size) {
            Some(size) => world - Vec2::new(size.width / 2.0, size.height / 2.0),
            None => world,
        }
    }
}
