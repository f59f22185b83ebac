use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Resolves a garment image reference to encoded bytes.
///
/// Implementations may block; loaders decide which thread runs them.
pub trait GarmentSource: Send + Sync {
    /// Encoded image bytes for `reference`.
    fn fetch(&self, reference: &str) -> DrapeResult<Vec<u8>>;
}

impl<S: GarmentSource + ?Sized> GarmentSource for Arc<S> {
    fn fetch(&self, reference: &str) -> DrapeResult<Vec<u8>> {
        (**self).fetch(reference)
    }
}

/// Reads garment images from files under a root directory.
#[derive(Clone, Debug)]
pub struct FsGarmentSource {
    root: PathBuf,
}

impl FsGarmentSource {
    /// Serve files relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl GarmentSource for FsGarmentSource {
    fn fetch(&self, reference: &str) -> DrapeResult<Vec<u8>> {
        let rel = normalize_rel_path(reference)?;
        let path = self.root.join(&rel);
        let bytes =
            std::fs::read(&path).with_context(|| format!("read garment '{}'", path.display()))?;
        Ok(bytes)
    }
}

/// Serves encoded garment images from memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryGarmentSource {
    blobs: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryGarmentSource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `reference`, replacing any previous entry.
    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.blobs.insert(reference.into(), Arc::new(bytes));
    }

    /// Builder form of [`Self::insert`].
    pub fn with(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(reference, bytes);
        self
    }
}

impl GarmentSource for MemoryGarmentSource {
    fn fetch(&self, reference: &str) -> DrapeResult<Vec<u8>> {
        self.blobs
            .get(reference)
            .map(|b| b.as_ref().clone())
            .ok_or_else(|| DrapeError::validation(format!("unknown garment reference '{reference}'")))
    }
}

/// Resolve a garment reference to a path under the source root.
///
/// Both separators are accepted and the result uses `/`. Empty and `.` segments are dropped.
/// Anything that could leave the root is rejected: a leading separator, a `..` segment, or a `:`
/// (Windows drive prefixes such as `C:`, URL schemes, alternate data streams).
pub(crate) fn normalize_rel_path(reference: &str) -> DrapeResult<String> {
    let unified = reference.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(DrapeError::validation(format!(
            "garment reference '{reference}' must be relative"
        )));
    }

    let mut segments = Vec::new();
    for seg in unified.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if seg == ".." {
            return Err(DrapeError::validation(format!(
                "garment reference '{reference}' must not contain '..'"
            )));
        }
        if seg.contains(':') {
            return Err(DrapeError::validation(format!(
                "garment reference '{reference}' must not contain ':'"
            )));
        }
        segments.push(seg);
    }

    if segments.is_empty() {
        return Err(DrapeError::validation(format!(
            "garment reference '{reference}' names no file"
        )));
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
