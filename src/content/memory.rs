//! In-memory provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashMap;

use super::{ContentError, ContentProvider, LeafContent};

/// URL → content map, with an optional page served for unknown URLs.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    pages: FxHashMap<String, Arc<LeafContent>>,
    fallback: Option<Arc<LeafContent>>,
    fetches: AtomicUsize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for every URL without its own page.
    pub fn with_fallback(mut self, content: LeafContent) -> Self {
        self.fallback = Some(Arc::new(content));
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, content: LeafContent) -> &mut Self {
        self.pages.insert(url.into(), Arc::new(content));
        self
    }

    /// Number of `fetch` calls so far, successful or not.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl ContentProvider for MemoryProvider {
    fn fetch(&self, url: &str) -> Result<Arc<LeafContent>, ContentError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.pages
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ContentError::NotFound(url.to_string()))
    }
}
