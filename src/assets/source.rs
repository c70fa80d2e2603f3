use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

/// Where frame bytes come from.
///
/// Implementations are shared across preload workers, so they must be thread-safe.
pub trait FrameSource: Send + Sync {
    /// Fetch the encoded bytes stored at `path` (as produced by
    /// [`SequenceDescriptor::path_for`](crate::SequenceDescriptor::path_for)).
    fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>>;
}

/// Reads frames from a directory that plays the role of the site root.
#[derive(Clone, Debug)]
pub struct DirFrameSource {
    root: PathBuf,
}

impl DirFrameSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameSource for DirFrameSource {
    fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let rel = normalize_site_path(path)?;
        let abs = self.root.join(Path::new(&rel));
        std::fs::read(&abs).with_context(|| format!("read frame bytes from '{}'", abs.display()))
    }
}

/// In-memory source keyed by the exact frame path.
#[derive(Clone, Debug, Default)]
pub struct MemoryFrameSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    pub fn with(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for MemoryFrameSource {
    fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such frame '{path}'"))
    }
}

/// Normalize a site path (`/video/arm/1.webp`, `video\arm\1.webp`) to a relative path.
///
/// A leading `/` anchors at the site root; `..` segments are rejected.
pub fn normalize_site_path(source: &str) -> ScrollSeqResult<String> {
    let s = source.replace('\\', "/");
    if s.trim().is_empty() {
        return Err(ScrollSeqError::validation("frame path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ScrollSeqError::validation(format!(
                "frame path '{source}' must not contain '..'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ScrollSeqError::validation(
            "frame path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
