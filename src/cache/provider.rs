//! Memoizing content provider.

use std::sync::Arc;

use super::PressureCache;
use crate::content::{ContentError, ContentProvider, LeafContent};

/// Wraps a provider and remembers fetched pages by URL.
///
/// The inner provider runs outside the cache lock. Two threads missing
/// the same URL at once may both fetch it; the later write wins.
pub struct CachingProvider<P> {
    inner: P,
    cache: PressureCache<String, Arc<LeafContent>>,
}

impl<P: ContentProvider> CachingProvider<P> {
    pub fn new(inner: P, cache: PressureCache<String, Arc<LeafContent>>) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn cache(&self) -> &PressureCache<String, Arc<LeafContent>> {
        &self.cache
    }
}

impl<P: ContentProvider> ContentProvider for CachingProvider<P> {
    fn fetch(&self, url: &str) -> Result<Arc<LeafContent>, ContentError> {
        let key = url.to_string();
        if let Some(content) = self.cache.get(&key) {
            crate::debug!("cache"; "hit {}", url);
            return Ok(content);
        }

        let content = self.inner.fetch(url)?;
        self.cache.set(key, Arc::clone(&content));
        Ok(content)
    }
}
