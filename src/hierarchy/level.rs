//! Level records.
//!
//! [`LevelConfig`] is the declarative description written by callers (or
//! read from `holotheca.toml`); [`HierarchyLevel`] is the compiled record
//! stored in a [`Hierarchy`](super::Hierarchy). Compilation happens once,
//! inside [`HierarchyBuilder::build`](super::HierarchyBuilder::build), so
//! every failure can name the offending level.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use super::format::{FormatFn, UrlFormat};
use super::policy::{Identifier, IdentifierPolicy, MatchFn, Predicate, RawIdentifier, TargetKind};
use crate::error::ConfigError;

// ============================================================================
// Declarative specs
// ============================================================================

/// Uncompiled predicate.
#[derive(Clone)]
pub enum PredicateSpec {
    Pattern(String),
    Range(RangeInclusive<i64>),
    /// Members are coerced to the level's target type at build time.
    Set(Vec<RawIdentifier>),
    Custom(MatchFn),
}

impl PredicateSpec {
    pub fn pattern(source: impl Into<String>) -> Self {
        Self::Pattern(source.into())
    }

    pub const fn range(range: RangeInclusive<i64>) -> Self {
        Self::Range(range)
    }

    pub fn set<I>(members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RawIdentifier>,
    {
        Self::Set(members.into_iter().map(Into::into).collect())
    }

    pub fn custom(check: impl Fn(&Identifier) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(check))
    }

    fn compile(self, level: &str, target: TargetKind) -> Result<Predicate, ConfigError> {
        match self {
            Self::Pattern(source) => Predicate::pattern(&source)
                .map_err(|err| ConfigError::predicate(level, err.to_string())),
            Self::Range(range) => Ok(Predicate::Range(range)),
            Self::Set(members) => members
                .into_iter()
                .map(|raw| {
                    target.coerce(raw).map_err(|reason| {
                        ConfigError::predicate(level, format!("set member rejected: {reason}"))
                    })
                })
                .collect::<Result<_, _>>()
                .map(Predicate::Set),
            Self::Custom(check) => Ok(Predicate::Custom(check)),
        }
    }
}

impl fmt::Debug for PredicateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(source) => f.debug_tuple("Pattern").field(source).finish(),
            Self::Range(range) => f.debug_tuple("Range").field(range).finish(),
            Self::Set(members) => f.debug_tuple("Set").field(members).finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

#[derive(Clone)]
enum UrlSpec {
    Template(String),
    Custom(FormatFn),
}

/// Declarative description of one level.
///
/// ```ignore
/// let wall = LevelConfig::new("wall")
///     .title("Wall")
///     .identifier(TargetKind::Integer, PredicateSpec::range(1..=4))
///     .url("-w{id}");
/// ```
#[derive(Clone)]
pub struct LevelConfig {
    name: String,
    title: Option<String>,
    identifier: Option<(TargetKind, PredicateSpec)>,
    url: Option<UrlSpec>,
}

impl LevelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            identifier: None,
            url: None,
        }
    }

    /// Display name. Levels without one are anonymous in display strings.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Declare the identifier type and its predicate.
    pub fn identifier(mut self, target: TargetKind, predicate: PredicateSpec) -> Self {
        self.identifier = Some((target, predicate));
        self
    }

    /// URL template, see [`UrlFormat::template`].
    pub fn url(mut self, template: impl Into<String>) -> Self {
        self.url = Some(UrlSpec::Template(template.into()));
        self
    }

    pub fn url_with(
        mut self,
        format: impl Fn(Option<&Identifier>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.url = Some(UrlSpec::Custom(Arc::new(format)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(super) fn compile(self) -> Result<HierarchyLevel, ConfigError> {
        let name = self.name;
        if name.trim().is_empty() {
            return Err(ConfigError::Wiring("level names cannot be empty".into()));
        }

        let policy = match self.identifier {
            None => IdentifierPolicy::none(),
            Some((target, spec)) => IdentifierPolicy::new(target, spec.compile(&name, target)?),
        };
        policy.validate(&name)?;

        let url = match self.url {
            None => UrlFormat::default(),
            Some(UrlSpec::Template(source)) => UrlFormat::template(&source)
                .map_err(|reason| ConfigError::url_format(&name, reason))?,
            Some(UrlSpec::Custom(format)) => UrlFormat::custom(move |id| format(id)),
        };

        Ok(HierarchyLevel {
            name,
            title: self.title,
            policy,
            url,
        })
    }
}

impl fmt::Debug for LevelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = match &self.url {
            None => None,
            Some(UrlSpec::Template(source)) => Some(source.as_str()),
            Some(UrlSpec::Custom(_)) => Some("<fn>"),
        };
        f.debug_struct("LevelConfig")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("identifier", &self.identifier)
            .field("url", &url)
            .finish()
    }
}

// ============================================================================
// HierarchyLevel
// ============================================================================

/// Compiled configuration record for one rank.
#[derive(Debug, Clone)]
pub struct HierarchyLevel {
    name: String,
    title: Option<String>,
    policy: IdentifierPolicy,
    url: UrlFormat,
}

impl HierarchyLevel {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Title if present, otherwise the name. Used in messages.
    #[inline]
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    #[inline]
    pub const fn policy(&self) -> &IdentifierPolicy {
        &self.policy
    }

    #[inline]
    pub const fn url_format(&self) -> &UrlFormat {
        &self.url
    }
}
