//! Leaf content retrieval.
//!
//! The locator never talks to the network itself. It hands a leaf
//! address's URL to a [`ContentProvider`] and gets back the page title and
//! its text as one blob.
//!
//! | Provider            | Source                                   |
//! |---------------------|------------------------------------------|
//! | `DirectoryProvider` | saved pages, one file per URL fingerprint |
//! | `MemoryProvider`    | in-memory map (fixtures, embedding)      |
//! | `Unavailable`       | nothing; every fetch fails               |
//! | `CachingProvider`   | memoizing decorator, see [`crate::cache`] |

mod directory;
pub mod html;
mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use directory::{DirectoryProvider, fingerprint};
pub use memory::MemoryProvider;

#[cfg(test)]
pub(crate) use memory::fixture;

/// Provider failures.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("no saved page for `{0}`")]
    NotFound(String),

    #[error("page `{0}` has no text block")]
    MissingText(String),

    #[error("no content source configured, cannot fetch `{0}`")]
    Unavailable(String),
}

/// Title and text of one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafContent {
    pub title: String,
    pub text: String,
}

impl LeafContent {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }

    /// Title without the trailing page number (`"jbcde 1"` → `"jbcde"`).
    pub fn book_title(&self) -> Option<&str> {
        let (book, number) = self.title.rsplit_once(' ')?;
        (!book.is_empty() && !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
            .then_some(book)
    }
}

/// Supplies raw leaf content for a resolved URL.
///
/// Called synchronously and outside any lock; may block.
pub trait ContentProvider: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Arc<LeafContent>, ContentError>;
}

impl<P: ContentProvider + ?Sized> ContentProvider for Arc<P> {
    fn fetch(&self, url: &str) -> Result<Arc<LeafContent>, ContentError> {
        (**self).fetch(url)
    }
}

/// Provider with no source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl ContentProvider for Unavailable {
    fn fetch(&self, url: &str) -> Result<Arc<LeafContent>, ContentError> {
        Err(ContentError::Unavailable(url.to_string()))
    }
}
