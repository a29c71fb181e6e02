//! One-shot hierarchy bootstrap.
//!
//! Levels are declared, linked pairwise, then frozen into an immutable
//! [`Hierarchy`] by [`HierarchyBuilder::build`]. Nothing can be relinked
//! afterwards.
//!
//! ```ignore
//! let hierarchy = (LevelConfig::new("dir")
//!     >> LevelConfig::new("file").identifier(TargetKind::String, PredicateSpec::pattern(".+")))
//!     .build()?;
//! ```

use std::ops::Shr;

use rustc_hash::FxHashMap;

use super::Hierarchy;
use super::level::LevelConfig;
use crate::error::ConfigError;

/// Collects level declarations and `parent >> child` links.
#[derive(Default)]
pub struct HierarchyBuilder {
    levels: Vec<LevelConfig>,
    index: FxHashMap<String, usize>,
    parents: Vec<Option<usize>>,
    children: Vec<Option<usize>>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a level. Names must be unique.
    pub fn level(&mut self, level: LevelConfig) -> Result<&mut Self, ConfigError> {
        let name = level.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ConfigError::DuplicateLevel(name));
        }
        self.index.insert(name, self.levels.len());
        self.levels.push(level);
        self.parents.push(None);
        self.children.push(None);
        Ok(self)
    }

    /// Link `parent >> child`. Both must already be declared, and each level
    /// has at most one parent and one child.
    pub fn link(&mut self, parent: &str, child: &str) -> Result<&mut Self, ConfigError> {
        let p = self.lookup(parent)?;
        let c = self.lookup(child)?;

        if p == c {
            return Err(ConfigError::Wiring(format!(
                "`{parent}` cannot be its own parent"
            )));
        }
        if let Some(existing) = self.children[p] {
            return Err(ConfigError::Wiring(format!(
                "`{parent}` already has child `{}`",
                self.levels[existing].name()
            )));
        }
        if let Some(existing) = self.parents[c] {
            return Err(ConfigError::Wiring(format!(
                "`{child}` already has parent `{}`",
                self.levels[existing].name()
            )));
        }

        self.children[p] = Some(c);
        self.parents[c] = Some(p);
        Ok(self)
    }

    fn lookup(&self, name: &str) -> Result<usize, ConfigError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownLevel(name.to_string()))
    }

    /// Walk parent links up to the root. `None` means the walk never ends.
    fn depth_of(&self, idx: usize) -> Option<usize> {
        let mut depth = 0;
        let mut current = idx;
        while let Some(parent) = self.parents[current] {
            depth += 1;
            if depth >= self.levels.len() {
                return None;
            }
            current = parent;
        }
        Some(depth)
    }

    /// Validate the wiring and freeze it.
    pub fn build(self) -> Result<Hierarchy, ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Wiring("a hierarchy needs at least one level".into()));
        }

        let roots: Vec<&str> = (0..self.levels.len())
            .filter(|&i| self.parents[i].is_none())
            .map(|i| self.levels[i].name())
            .collect();
        if roots.len() > 1 {
            return Err(ConfigError::Wiring(format!(
                "multiple root levels: {}",
                roots.join(", ")
            )));
        }

        let mut slots: Vec<Option<LevelConfig>> = (0..self.levels.len()).map(|_| None).collect();
        let mut cyclic = Vec::new();
        let depths: Vec<Option<usize>> = (0..self.levels.len()).map(|i| self.depth_of(i)).collect();
        for (i, depth) in depths.iter().enumerate() {
            if depth.is_none() {
                cyclic.push(self.levels[i].name().to_string());
            }
        }
        if !cyclic.is_empty() {
            return Err(ConfigError::Wiring(format!(
                "levels form a cycle: {}",
                cyclic.join(", ")
            )));
        }

        for (level, depth) in self.levels.into_iter().zip(depths.into_iter().flatten()) {
            // Single parent and single child per level: depths are distinct
            slots[depth] = Some(level);
        }

        let mut compiled = Vec::with_capacity(slots.len());
        for (depth, slot) in slots.into_iter().enumerate() {
            let Some(level) = slot else {
                return Err(ConfigError::Wiring(format!(
                    "no level at depth {depth}, some levels are unreachable from the root"
                )));
            };
            let level = level.compile()?;
            if depth > 0 && level.policy().is_none() {
                return Err(ConfigError::predicate(
                    level.name(),
                    "only the root level may omit identifiers",
                ));
            }
            compiled.push(level);
        }

        crate::debug!(
            "hierarchy";
            "built {}",
            compiled.iter().map(|l| l.name()).collect::<Vec<_>>().join(" >> ")
        );
        Ok(Hierarchy::from_levels(compiled))
    }
}

// ============================================================================
// `>>` chains
// ============================================================================

/// Linear chain built with `>>`, root first.
#[derive(Clone)]
pub struct Chain(Vec<LevelConfig>);

impl Chain {
    pub fn build(self) -> Result<Hierarchy, ConfigError> {
        let mut builder = HierarchyBuilder::new();
        for level in &self.0 {
            builder.level(level.clone())?;
        }
        for pair in self.0.windows(2) {
            builder.link(pair[0].name(), pair[1].name())?;
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<LevelConfig> for Chain {
    fn from(level: LevelConfig) -> Self {
        Self(vec![level])
    }
}

impl Shr for LevelConfig {
    type Output = Chain;

    fn shr(self, child: LevelConfig) -> Chain {
        Chain(vec![self, child])
    }
}

impl Shr<LevelConfig> for Chain {
    type Output = Chain;

    fn shr(mut self, child: LevelConfig) -> Chain {
        self.0.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{PredicateSpec, TargetKind};

    fn numbered(name: &str) -> LevelConfig {
        LevelConfig::new(name).identifier(TargetKind::Integer, PredicateSpec::range(1..=9))
    }

    #[test]
    fn test_build_orders_levels_by_depth() {
        let mut builder = HierarchyBuilder::new();
        builder
            .level(numbered("shelf"))
            .unwrap()
            .level(LevelConfig::new("room"))
            .unwrap()
            .level(numbered("wall"))
            .unwrap();
        builder.link("wall", "shelf").unwrap().link("room", "wall").unwrap();

        let hierarchy = builder.build().unwrap();
        let names: Vec<_> = hierarchy.levels().iter().map(|l| l.name()).collect();
        assert_eq!(names, ["room", "wall", "shelf"]);
        assert_eq!(hierarchy.find("shelf").unwrap().depth(), 2);
    }

    #[test]
    fn test_link_rejects_bad_wiring() {
        let mut builder = HierarchyBuilder::new();
        builder.level(LevelConfig::new("room")).unwrap();
        builder.level(numbered("wall")).unwrap();
        builder.level(numbered("door")).unwrap();

        assert!(matches!(
            builder.link("room", "attic"),
            Err(ConfigError::UnknownLevel(name)) if name == "attic"
        ));
        assert!(matches!(builder.link("wall", "wall"), Err(ConfigError::Wiring(_))));

        builder.link("room", "wall").unwrap();
        assert!(matches!(builder.link("room", "door"), Err(ConfigError::Wiring(_))));
        assert!(matches!(builder.link("door", "wall"), Err(ConfigError::Wiring(_))));
        assert!(matches!(
            builder.level(numbered("wall")),
            Err(ConfigError::DuplicateLevel(_))
        ));
    }

    #[test]
    fn test_build_rejects_multiple_roots() {
        let mut builder = HierarchyBuilder::new();
        builder.level(LevelConfig::new("a")).unwrap();
        builder.level(LevelConfig::new("b")).unwrap();
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("multiple root levels"));
    }

    #[test]
    fn test_build_rejects_cycles() {
        let mut builder = HierarchyBuilder::new();
        builder.level(LevelConfig::new("root")).unwrap();
        builder.level(numbered("a")).unwrap();
        builder.level(numbered("b")).unwrap();
        builder.link("a", "b").unwrap().link("b", "a").unwrap();

        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_build_rejects_empty_and_anonymous_children() {
        assert!(HierarchyBuilder::new().build().is_err());

        let err = (LevelConfig::new("root") >> LevelConfig::new("child"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Predicate { ref level, .. } if level == "child"));
    }

    #[test]
    fn test_chain_operator() {
        let chain = LevelConfig::new("root") >> numbered("wall") >> numbered("shelf");
        assert_eq!(chain.len(), 3);

        let hierarchy = chain.build().unwrap();
        assert_eq!(hierarchy.len(), 3);
        assert_eq!(hierarchy.leaf().name(), "shelf");
        assert_eq!(hierarchy.leaf().parent().unwrap().name(), "wall");

        let single = Chain::from(LevelConfig::new("only")).build().unwrap();
        assert!(single.root().is_leaf());
    }
}
