//! Decoded image cache with asynchronous loaders.
//!
//! Entries are keyed by the component's image reference and written at most
//! once: the first completed load wins and is never evicted. Loaders report
//! back through an [`ImageSink`]; completions are queued and applied by
//! [`ImageCache::drain`] on the render thread, which also notifies
//! subscribers so the host can repaint.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine;
use peniko::{Blob, ImageAlphaType, ImageData, ImageFormat};
use thiserror::Error;
use wirecanvas_core::RepaintHandle;

/// Image loading errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported image reference: {0}")]
    Unsupported(String),
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Load state of a single reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Missing,
    Loading,
    Ready,
    Failed,
}

type Completion = (String, Result<ImageData, ImageError>);
type Subscriber = Box<dyn FnMut(&str) + Send + Sync>;

/// Completion handle passed to an [`ImageLoader`].
pub struct ImageSink {
    key: String,
    queue: Arc<Mutex<Vec<Completion>>>,
    repaint: Option<RepaintHandle>,
}

impl ImageSink {
    /// The reference being loaded.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Report the load result. May be called from any thread.
    pub fn complete(self, result: Result<ImageData, ImageError>) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.push((self.key, result));
        drop(queue);
        if let Some(repaint) = &self.repaint {
            repaint.request();
        }
    }
}

/// Source of image bytes for a reference.
pub trait ImageLoader: Send + Sync {
    /// Start loading `reference`; the result must eventually go to `sink`.
    fn load(&self, reference: &str, sink: ImageSink);
}

/// Decode encoded image bytes into RGBA8 image data.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData, ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        data: Blob::new(Arc::new(rgba.into_vec())),
        format: ImageFormat::Rgba8,
        width,
        height,
        alpha_type: ImageAlphaType::Alpha,
    })
}

/// Extract the payload of a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(reference: &str) -> Result<Vec<u8>, ImageError> {
    let rest = reference
        .strip_prefix("data:")
        .ok_or_else(|| ImageError::Unsupported(reference.chars().take(32).collect()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageError::Unsupported("data URL without payload".into()))?;
    if !header.ends_with(";base64") {
        return Err(ImageError::Unsupported(format!("data URL encoding '{header}'")));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

/// Decodes inline `data:` URLs synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlLoader;

impl ImageLoader for DataUrlLoader {
    fn load(&self, reference: &str, sink: ImageSink) {
        let result = decode_data_url(reference).and_then(|bytes| decode_image(&bytes));
        sink.complete(result);
    }
}

/// Data URLs inline, local file paths on a worker thread (native only).
/// Remote URLs are left to the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoader;

impl ImageLoader for DefaultLoader {
    fn load(&self, reference: &str, sink: ImageSink) {
        if reference.starts_with("data:") {
            DataUrlLoader.load(reference, sink);
            return;
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            sink.complete(Err(ImageError::Unsupported(reference.to_string())));
            return;
        }
        load_file(reference.to_string(), sink);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_file(path: String, sink: ImageSink) {
    std::thread::spawn(move || {
        let result = std::fs::read(&path)
            .map_err(ImageError::from)
            .and_then(|bytes| decode_image(&bytes));
        sink.complete(result);
    });
}

#[cfg(target_arch = "wasm32")]
fn load_file(path: String, sink: ImageSink) {
    sink.complete(Err(ImageError::Unsupported(path)));
}

/// Process-wide decoded image store.
pub struct ImageCache {
    entries: HashMap<String, ImageData>,
    pending: HashSet<String>,
    failed: HashSet<String>,
    queue: Arc<Mutex<Vec<Completion>>>,
    loader: Box<dyn ImageLoader>,
    repaint: Option<RepaintHandle>,
    subscribers: Vec<Subscriber>,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(Box::new(DefaultLoader))
    }
}

impl ImageCache {
    pub fn new(loader: Box<dyn ImageLoader>) -> Self {
        Self {
            entries: HashMap::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
            queue: Arc::new(Mutex::new(Vec::new())),
            loader,
            repaint: None,
            subscribers: Vec::new(),
        }
    }

    /// Completions will request a repaint through `handle`.
    pub fn set_repaint_handle(&mut self, handle: RepaintHandle) {
        self.repaint = Some(handle);
    }

    /// Decoded image for `reference`, if loaded.
    pub fn get(&self, reference: &str) -> Option<&ImageData> {
        self.entries.get(reference)
    }

    pub fn status(&self, reference: &str) -> ImageStatus {
        if self.entries.contains_key(reference) {
            ImageStatus::Ready
        } else if self.pending.contains(reference) {
            ImageStatus::Loading
        } else if self.failed.contains(reference) {
            ImageStatus::Failed
        } else {
            ImageStatus::Missing
        }
    }

    /// Start loading `reference` unless it is loaded, in flight or failed.
    pub fn request(&mut self, reference: &str) -> ImageStatus {
        let status = self.status(reference);
        if status != ImageStatus::Missing {
            return status;
        }
        log::debug!("Loading image {}", preview(reference));
        self.pending.insert(reference.to_string());
        let sink = ImageSink {
            key: reference.to_string(),
            queue: Arc::clone(&self.queue),
            repaint: self.repaint.clone(),
        };
        self.loader.load(reference, sink);
        self.status(reference)
    }

    /// Register a callback invoked with the key of every newly cached image.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Apply queued completions. Returns the number of images newly cached.
    pub fn drain(&mut self) -> usize {
        let completions = {
            let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *queue)
        };
        let mut added = 0;
        for (key, result) in completions {
            self.pending.remove(&key);
            match result {
                Ok(data) => {
                    if self.insert(key, data) {
                        added += 1;
                    }
                }
                Err(err) => {
                    log::warn!("Image {} failed to load: {err}", preview(&key));
                    if !self.entries.contains_key(&key) {
                        self.failed.insert(key);
                    }
                }
            }
        }
        added
    }

    /// Cache `data` under `key` unless an entry exists. Returns whether it was stored.
    pub fn insert(&mut self, key: String, data: ImageData) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.failed.remove(&key);
        self.pending.remove(&key);
        for subscriber in &mut self.subscribers {
            subscriber(&key);
        }
        self.entries.insert(key, data);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shortened reference for log lines; data URLs can be megabytes long.
fn preview(reference: &str) -> String {
    const MAX: usize = 48;
    if reference.len() <= MAX {
        reference.to_string()
    } else {
        let head: String = reference.chars().take(MAX).collect();
        format!("{head}...")
    }
}
