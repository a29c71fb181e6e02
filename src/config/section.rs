//! `holotheca.toml` sections.
//!
//! # Example
//!
//! ```toml
//! [cache]
//! max_pressure = 1000     # Soft capacity of the page cache
//! overpressure = 10       # Slack before compaction
//!
//! [locator]
//! errors = "propagate"    # or "normalize"
//!
//! [content]
//! dir = "~/babel-pages"   # Saved pages, see DirectoryProvider
//!
//! [[level]]
//! name = "wall"
//! title = "Wall"
//! parent = "hex"
//! target = "integer"
//! range = [1, 4]
//! url = "-w{id}"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::util::expand_tilde;
use crate::cache::DEFAULT_OVERPRESSURE;
use crate::error::ConfigError;
use crate::hierarchy::{LevelConfig, PredicateSpec, RawIdentifier, TargetKind};
use crate::locator::ErrorPolicy;

// ============================================================================
// [cache]
// ============================================================================

/// Page cache sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_pressure: usize,
    pub overpressure: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_pressure: 1000,
            overpressure: DEFAULT_OVERPRESSURE,
        }
    }
}

// ============================================================================
// [locator]
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Error reporting policy of `locate`.
    pub errors: ErrorPolicy,
    /// Custom reference grammar with `identifiers`, `separator` and `range` captures.
    pub grammar: Option<String>,
}

// ============================================================================
// [content]
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory of saved pages.
    pub dir: Option<PathBuf>,
}

impl ContentConfig {
    /// Page directory with `~` expanded.
    pub fn dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_tilde)
    }
}

// ============================================================================
// [[level]]
// ============================================================================

/// Member of a `set` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetMember {
    Integer(i64),
    Text(String),
}

impl From<SetMember> for RawIdentifier {
    fn from(member: SetMember) -> Self {
        match member {
            SetMember::Integer(n) => Self::Integer(n),
            SetMember::Text(s) => Self::Text(s),
        }
    }
}

/// One `[[level]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSection {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Omitted for the root.
    #[serde(default)]
    pub parent: Option<String>,
    /// Required whenever a predicate is given.
    #[serde(default)]
    pub target: Option<TargetKind>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub range: Option<[i64; 2]>,
    #[serde(default)]
    pub set: Option<Vec<SetMember>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl LevelSection {
    fn predicate(&self) -> Result<Option<PredicateSpec>, ConfigError> {
        let mut specs = Vec::new();
        if let Some(pattern) = &self.pattern {
            specs.push(PredicateSpec::pattern(pattern.clone()));
        }
        if let Some([start, end]) = self.range {
            specs.push(PredicateSpec::range(start..=end));
        }
        if let Some(set) = &self.set {
            specs.push(PredicateSpec::set(set.iter().cloned()));
        }

        if specs.len() > 1 {
            return Err(ConfigError::predicate(
                &self.name,
                "use only one of `pattern`, `range` and `set`",
            ));
        }
        Ok(specs.pop())
    }

    /// Declarative level for the hierarchy builder.
    pub fn to_level(&self) -> Result<LevelConfig, ConfigError> {
        let mut level = LevelConfig::new(&self.name);
        if let Some(title) = &self.title {
            level = level.title(title);
        }
        if let Some(url) = &self.url {
            level = level.url(url);
        }

        match (self.target, self.predicate()?) {
            (None | Some(TargetKind::None), None) => Ok(level),
            (Some(target), Some(predicate)) => Ok(level.identifier(target, predicate)),
            (None, Some(_)) => Err(ConfigError::predicate(
                &self.name,
                "`target` is required when a predicate is given",
            )),
            (Some(target), None) => Err(ConfigError::predicate(
                &self.name,
                format!("{target:?} identifiers need one of `pattern`, `range` or `set`"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(toml: &str) -> LevelSection {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cache = CacheConfig::default();
        assert_eq!(cache.max_pressure, 1000);
        assert_eq!(cache.overpressure, 10);
        assert_eq!(LocatorConfig::default().errors, ErrorPolicy::Propagate);
        assert!(ContentConfig::default().dir().is_none());
    }

    #[test]
    fn test_set_members_are_untagged() {
        let section = level(
            r#"
            name = "ext"
            target = "string"
            set = ["rb", "txt", 3]
            "#,
        );
        assert_eq!(
            section.set.as_deref(),
            Some(
                &[
                    SetMember::Text("rb".into()),
                    SetMember::Text("txt".into()),
                    SetMember::Integer(3)
                ][..]
            )
        );
        assert!(section.to_level().is_ok());
    }

    #[test]
    fn test_target_is_required_with_predicate() {
        let err = level("name = \"wall\"\nrange = [1, 4]").to_level().unwrap_err();
        assert!(err.to_string().contains("`target` is required"));

        let err = level("name = \"wall\"\ntarget = \"integer\"").to_level().unwrap_err();
        assert!(matches!(err, ConfigError::Predicate { .. }));

        assert!(level("name = \"root\"").to_level().is_ok());
        assert!(level("name = \"root\"\ntarget = \"none\"").to_level().is_ok());
    }

    #[test]
    fn test_single_predicate() {
        let err = level(
            r#"
            name = "wall"
            target = "integer"
            range = [1, 4]
            pattern = "[0-9]"
            "#,
        )
        .to_level()
        .unwrap_err();
        assert!(err.to_string().contains("only one of"));
    }
}
