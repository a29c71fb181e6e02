//! Realized addresses.
//!
//! An [`Address`] is an immutable node in the tree spanned by a
//! [`Hierarchy`](crate::Hierarchy): its level, a shared reference to its
//! parent, and a validated identifier. Ancestors are collected eagerly at
//! construction, so navigation never walks the parent chain.
//!
//! ```text
//! root ─ Hex 2abz0 ─ Wall 2 ─ Shelf 4 ─ Volume 5 ─ Page 12
//!  ^lineage[0]                                      ^self
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::AddressError;
use crate::hierarchy::{Identifier, LevelRef, RawIdentifier};

/// Immutable, cheaply clonable address.
#[derive(Clone)]
pub struct Address(Arc<Node>);

struct Node {
    level: LevelRef,
    parent: Option<Address>,
    identifier: Option<Identifier>,
    /// Ancestors, root first, parent last. Excludes self.
    lineage: Arc<[Address]>,
}

impl Address {
    /// Assemble a node. Callers go through [`LevelRef::construct`], which
    /// has already validated the parent and the identifier.
    pub(crate) fn new(
        level: LevelRef,
        parent: Option<Address>,
        identifier: Option<Identifier>,
    ) -> Self {
        let lineage = match &parent {
            Some(parent) => Arc::from(parent.path()),
            None => Arc::from(Vec::new()),
        };
        Self(Arc::new(Node {
            level,
            parent,
            identifier,
            lineage,
        }))
    }

    #[inline]
    pub fn level(&self) -> &LevelRef {
        &self.0.level
    }

    #[inline]
    pub fn parent(&self) -> Option<&Address> {
        self.0.parent.as_ref()
    }

    #[inline]
    pub fn identifier(&self) -> Option<&Identifier> {
        self.0.identifier.as_ref()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.0.lineage.len()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.0.level.is_leaf()
    }

    /// Ancestors, root first. Empty at the root.
    #[inline]
    pub fn ancestors(&self) -> &[Address] {
        &self.0.lineage
    }

    /// Root..self inclusive.
    pub fn path(&self) -> Vec<Address> {
        let mut path = Vec::with_capacity(self.depth() + 1);
        path.extend(self.0.lineage.iter().cloned());
        path.push(self.clone());
        path
    }

    fn path_iter(&self) -> impl Iterator<Item = &Address> {
        self.0.lineage.iter().chain(std::iter::once(self))
    }

    /// Identifiers along the path, skipping identifier-less levels.
    pub fn identifiers(&self) -> Vec<Identifier> {
        self.path_iter()
            .filter_map(|addr| addr.identifier().cloned())
            .collect()
    }

    pub fn root(&self) -> Address {
        self.0.lineage.first().cloned().unwrap_or_else(|| self.clone())
    }

    /// Ancestor `n` ranks up. Overshooting clamps at the root.
    pub fn up(&self, n: usize) -> Address {
        let depth = self.depth();
        match n {
            0 => self.clone(),
            n if n >= depth => self.root(),
            n => self.0.lineage[depth - n].clone(),
        }
    }

    /// Child address with `identifier`, one rank down.
    pub fn down(&self, identifier: impl Into<RawIdentifier>) -> Result<Address, AddressError> {
        let child = self.0.level.child().ok_or_else(|| {
            AddressError::InvalidHierarchy(format!(
                "nowhere to go down: {} is the leaf level",
                self.0.level.label()
            ))
        })?;
        child.construct(Some(self), Some(identifier.into()))
    }

    /// Apply [`down`](Self::down) for each identifier in order.
    ///
    /// No identifiers returns `self` unchanged; the first failure aborts
    /// the whole descent.
    pub fn dig<I>(&self, identifiers: I) -> Result<Address, AddressError>
    where
        I: IntoIterator,
        I::Item: Into<RawIdentifier>,
    {
        identifiers
            .into_iter()
            .try_fold(self.clone(), |addr, id| addr.down(id))
    }

    /// This level's URL fragment.
    pub fn to_url_part(&self) -> String {
        self.0.level.url_format().format(self.identifier())
    }

    /// URL fragments of the whole path, concatenated.
    pub fn to_url(&self) -> String {
        self.path_iter().map(Address::to_url_part).collect()
    }

    /// `"Title identifier"` for this level alone; either half may be absent.
    fn display_part(&self) -> String {
        let title = self.0.level.title();
        match (title, self.identifier()) {
            (Some(title), Some(id)) => format!("{title} {id}"),
            (Some(title), None) => title.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => String::new(),
        }
    }

    /// e.g. `"Hex 2abz0, Wall 2, Shelf 4, Volume 5, Page 12"`.
    pub fn to_display(&self) -> String {
        self.path_iter()
            .map(Address::display_part)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether both handles share the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.level == other.0.level
                && self.0.identifier == other.0.identifier
                && self.0.parent == other.0.parent)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.depth().hash(state);
        for addr in self.path_iter() {
            addr.identifier().hash(state);
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}@{}: {})", self.0.level.name(), self.depth(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{Hierarchy, LevelConfig, PredicateSpec, TargetKind};
    use rustc_hash::FxHashSet;

    fn root() -> Address {
        Hierarchy::babel().root().construct(None, None).unwrap()
    }

    fn page() -> Address {
        root().dig(["2abz0", "2", "4", "5", "12"]).unwrap()
    }

    #[test]
    fn test_display_string() {
        let page = page();
        assert_eq!(
            page.to_display(),
            "Hex 2abz0, Wall 2, Shelf 4, Volume 5, Page 12"
        );
        assert_eq!(page.to_string(), page.to_display());
        assert_eq!(root().to_display(), "");
    }

    #[test]
    fn test_depth_and_path() {
        let page = page();
        assert_eq!(page.depth(), 5);
        assert!(page.is_leaf());
        assert_eq!(page.identifier(), Some(&Identifier::Integer(12)));

        let path = page.path();
        assert_eq!(path.len(), 6);
        assert!(path[0].is_root());
        assert!(path[5].ptr_eq(&page));
        for pair in path.windows(2) {
            assert_eq!(pair[1].depth(), pair[0].depth() + 1);
            assert!(pair[1].parent().unwrap().ptr_eq(&pair[0]));
        }
        assert_eq!(page.ancestors().len(), 5);
    }

    #[test]
    fn test_up_clamps_at_root() {
        let page = page();
        assert!(page.up(0).ptr_eq(&page));
        assert_eq!(page.up(1).identifier(), Some(&Identifier::Integer(5)));
        assert_eq!(page.up(4).to_display(), "Hex 2abz0");
        assert!(page.up(page.depth()).is_root());
        assert!(page.up(page.depth() + 10).is_root());
        assert!(page.up(5).ptr_eq(&page.root()));
        assert!(root().up(3).is_root());
    }

    #[test]
    fn test_dig_empty_is_identity() {
        let page = page();
        let same = page.dig(Vec::<RawIdentifier>::new()).unwrap();
        assert!(same.ptr_eq(&page));
    }

    #[test]
    fn test_down_past_leaf() {
        let err = page().down(1).unwrap_err();
        assert!(err.is_invalid_hierarchy());
        assert!(err.to_string().contains("nowhere to go down"));
    }

    #[test]
    fn test_out_of_policy_identifier() {
        let hex = root().down("2abz0").unwrap();
        let err = hex.down(8).unwrap_err();
        assert!(err.is_invalid_identifier());

        let err = root().dig(["2abz0", "2", "9"]).unwrap_err();
        assert!(err.is_invalid_identifier());

        let err = root().down("2ABZ0").unwrap_err();
        assert!(err.is_invalid_identifier());
    }

    #[test]
    fn test_urls() {
        let page = page();
        assert_eq!(page.to_url_part(), ":12");
        assert_eq!(page.up(1).to_url_part(), "-v05");
        assert_eq!(root().to_url(), "https://libraryofbabel.info/book.cgi?");
        assert_eq!(
            page.to_url(),
            "https://libraryofbabel.info/book.cgi?2abz0-w2-s4-v05:12"
        );
    }

    #[test]
    fn test_structural_equality() {
        let a = page();
        let b = root().dig(["2abz0", "2", "4", "5", "12"].map(String::from)).unwrap();
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, a.up(1).down(13).unwrap());

        let set: FxHashSet<_> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(a.identifiers().len(), 5);
    }

    #[test]
    fn test_identifier_coercion_roundtrip() {
        let files = (LevelConfig::new("root")
            >> LevelConfig::new("ext")
                .title("Ext")
                .identifier(TargetKind::Symbol, PredicateSpec::set(["rb", "txt"]))
                .url(".{id}"))
        .build()
        .unwrap();

        let root = files.root().construct(None, None).unwrap();
        let ext = root.down("rb").unwrap();
        assert_eq!(ext.identifier(), Some(&Identifier::symbol("rb")));

        let again = root
            .down(RawIdentifier::from(ext.identifier().unwrap()))
            .unwrap();
        assert_eq!(again, ext);
        assert_eq!(ext.to_display(), "Ext rb");
        assert_eq!(ext.to_url(), ".rb");
        assert!(root.down("md").unwrap_err().is_invalid_identifier());
    }
}
