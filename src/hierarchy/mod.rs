//! Fixed-depth hierarchy of levels.
//!
//! A [`Hierarchy`] is an immutable, shared list of [`HierarchyLevel`]
//! records ordered root → leaf. Levels are addressed by [`LevelRef`], a
//! cheap handle (hierarchy + depth) that knows its neighbours and can
//! construct [`Address`]es.
//!
//! # Example
//!
//! ```text
//! (root) >> Hex >> Wall >> Shelf >> Volume >> Page
//!   0        1      2       3        4        5
//! ```

mod babel;
mod builder;
mod format;
mod level;
mod policy;

use std::fmt;
use std::sync::Arc;

pub use babel::{BOOK_URL, HEX_PATTERN};
pub use builder::{Chain, HierarchyBuilder};
pub use format::{FormatFn, UrlFormat};
pub use level::{HierarchyLevel, LevelConfig, PredicateSpec};
pub use policy::{
    Identifier, IdentifierPolicy, MatchFn, Predicate, RawIdentifier, Symbol, TargetKind,
};

use crate::address::Address;
use crate::error::AddressError;

// ============================================================================
// Hierarchy
// ============================================================================

/// Immutable chain of levels, root first.
///
/// Cloning shares the same chain. Two handles are equal only when they
/// point at the same chain.
#[derive(Clone)]
pub struct Hierarchy(Arc<[HierarchyLevel]>);

impl Hierarchy {
    pub fn builder() -> HierarchyBuilder {
        HierarchyBuilder::new()
    }

    /// Built-in Library of Babel hierarchy.
    pub fn babel() -> Self {
        babel::hierarchy()
    }

    pub(crate) fn from_levels(levels: Vec<HierarchyLevel>) -> Self {
        Self(Arc::from(levels))
    }

    #[inline]
    pub fn levels(&self) -> &[HierarchyLevel] {
        &self.0
    }

    /// Number of levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Depth of the leaf level.
    #[inline]
    pub fn leaf_depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn level(&self, depth: usize) -> Option<LevelRef> {
        (depth < self.0.len()).then(|| LevelRef {
            hierarchy: self.clone(),
            depth,
        })
    }

    pub fn root(&self) -> LevelRef {
        LevelRef {
            hierarchy: self.clone(),
            depth: 0,
        }
    }

    pub fn leaf(&self) -> LevelRef {
        LevelRef {
            hierarchy: self.clone(),
            depth: self.leaf_depth(),
        }
    }

    /// Look a level up by name.
    pub fn find(&self, name: &str) -> Option<LevelRef> {
        self.0
            .iter()
            .position(|level| level.name() == name)
            .and_then(|depth| self.level(depth))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Hierarchy {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Hierarchy {}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(HierarchyLevel::name))
            .finish()
    }
}

// ============================================================================
// LevelRef
// ============================================================================

/// Positioned handle to one level of a [`Hierarchy`].
#[derive(Clone, PartialEq, Eq)]
pub struct LevelRef {
    hierarchy: Hierarchy,
    depth: usize,
}

impl LevelRef {
    #[inline]
    pub fn config(&self) -> &HierarchyLevel {
        &self.hierarchy.0[self.depth]
    }

    #[inline]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.config().name()
    }

    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.config().title()
    }

    #[inline]
    pub fn label(&self) -> &str {
        self.config().label()
    }

    #[inline]
    pub fn policy(&self) -> &IdentifierPolicy {
        self.config().policy()
    }

    #[inline]
    pub fn url_format(&self) -> &UrlFormat {
        self.config().url_format()
    }

    /// `0` at the root, parent depth + 1 below.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<Self> {
        self.depth.checked_sub(1).and_then(|d| self.hierarchy.level(d))
    }

    pub fn child(&self) -> Option<Self> {
        self.hierarchy.level(self.depth + 1)
    }

    pub fn root(&self) -> Self {
        self.hierarchy.root()
    }

    #[inline]
    pub const fn is_root(&self) -> bool {
        self.depth == 0
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.depth == self.hierarchy.leaf_depth()
    }

    /// Build an address at this level.
    ///
    /// `parent` must sit at this level's parent level of the same hierarchy
    /// (`None` at the root). The identifier is coerced to the level's
    /// target type and then checked against its predicate.
    pub fn construct(
        &self,
        parent: Option<&Address>,
        identifier: Option<RawIdentifier>,
    ) -> Result<Address, AddressError> {
        let expected = self.parent();
        let actual = parent.map(Address::level);
        if expected.as_ref() != actual {
            return Err(AddressError::InvalidHierarchy(format!(
                "{} expects parent {}, got {}",
                self.label(),
                describe(expected.as_ref()),
                describe(actual),
            )));
        }

        let identifier = self.policy().admit(self.label(), identifier)?;
        Ok(Address::new(self.clone(), parent.cloned(), identifier))
    }
}

fn describe(level: Option<&LevelRef>) -> String {
    match level {
        Some(level) => format!("`{}`", level.name()),
        None => "none".to_string(),
    }
}

impl fmt::Debug for LevelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelRef({}@{})", self.name(), self.depth)
    }
}
