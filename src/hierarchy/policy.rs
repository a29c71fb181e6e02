//! Identifier values and the per-level policy that admits them.
//!
//! Admission is two steps: the raw value is coerced to the level's declared
//! [`TargetKind`], then the [`Predicate`] gets the final say.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::RangeInclusive;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{AddressError, ConfigError};

// ============================================================================
// Raw identifiers
// ============================================================================

/// Identifier as supplied by a caller, before coercion.
///
/// References produce text; generators usually produce integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawIdentifier {
    Text(String),
    Integer(i64),
}

impl fmt::Display for RawIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RawIdentifier {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawIdentifier {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for RawIdentifier {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i64> for RawIdentifier {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for RawIdentifier {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for RawIdentifier {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<&Identifier> for RawIdentifier {
    fn from(id: &Identifier) -> Self {
        match id {
            Identifier::Text(s) => Self::Text(s.to_string()),
            Identifier::Integer(n) => Self::Integer(*n),
            Identifier::Symbol(s) => Self::Text(s.as_str().to_string()),
        }
    }
}

impl From<Identifier> for RawIdentifier {
    fn from(id: Identifier) -> Self {
        Self::from(&id)
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// Process-wide symbol table.
static SYMBOLS: LazyLock<Mutex<FxHashSet<Arc<str>>>> =
    LazyLock::new(|| Mutex::new(FxHashSet::default()));

/// Interned string. Equal symbols share one allocation, so equality and
/// hashing work on the pointer.
#[derive(Clone)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn intern(name: &str) -> Self {
        let mut table = SYMBOLS.lock();
        if let Some(existing) = table.get(name) {
            return Self(Arc::clone(existing));
        }
        let symbol: Arc<str> = Arc::from(name);
        table.insert(Arc::clone(&symbol));
        Self(symbol)
    }

    /// The interned symbol if one exists, otherwise an unregistered one
    /// equal to nothing but itself.
    fn provisional(name: &str) -> Self {
        match SYMBOLS.lock().get(name) {
            Some(existing) => Self(Arc::clone(existing)),
            None => Self(Arc::from(name)),
        }
    }

    /// Whether `name` has been interned.
    pub fn is_interned(name: &str) -> bool {
        SYMBOLS.lock().contains(name)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const u8 as usize).hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Identifier
// ============================================================================

/// Coerced identifier, as stored in an [`Address`](crate::Address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Text(Arc<str>),
    Integer(i64),
    Symbol(Symbol),
}

impl Identifier {
    pub fn text(s: &str) -> Self {
        Self::Text(Arc::from(s))
    }

    pub fn symbol(s: &str) -> Self {
        Self::Symbol(Symbol::intern(s))
    }

    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Text form for text-like identifiers (text and symbols).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Symbol(s) => Some(s.as_str()),
            Self::Integer(_) => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Symbol(s) => f.write_str(s.as_str()),
        }
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

// ============================================================================
// TargetKind
// ============================================================================

/// Declared target type of a level's identifiers.
///
/// Declared explicitly per level; never inferred from the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Immutable string.
    String,
    /// Decimal integer.
    Integer,
    /// Interned symbol.
    Symbol,
    /// Passed through as given.
    Opaque,
    /// The level carries no identifier.
    None,
}

impl TargetKind {
    /// Coerce a raw identifier. Returns a reason on failure.
    pub fn coerce(self, raw: RawIdentifier) -> Result<Identifier, String> {
        match (self, raw) {
            (Self::String, RawIdentifier::Text(s)) => Ok(Identifier::Text(Arc::from(s))),
            (Self::String, RawIdentifier::Integer(n)) => {
                Ok(Identifier::Text(Arc::from(n.to_string())))
            }
            (Self::Integer, RawIdentifier::Integer(n)) => Ok(Identifier::Integer(n)),
            (Self::Integer, RawIdentifier::Text(s)) => parse_decimal(&s)
                .map(Identifier::Integer)
                .ok_or_else(|| format!("`{s}` is not a decimal integer")),
            (Self::Symbol, raw) => Ok(Identifier::Symbol(Symbol::intern(&raw.to_string()))),
            (Self::Opaque, RawIdentifier::Text(s)) => Ok(Identifier::Text(Arc::from(s))),
            (Self::Opaque, RawIdentifier::Integer(n)) => Ok(Identifier::Integer(n)),
            (Self::None, raw) => Err(format!("no identifier expected, got `{raw}`")),
        }
    }

    /// Whether an already coerced identifier has this kind's shape.
    pub const fn accepts(self, id: &Identifier) -> bool {
        matches!(
            (self, id),
            (Self::String, Identifier::Text(_))
                | (Self::Integer, Identifier::Integer(_))
                | (Self::Symbol, Identifier::Symbol(_))
                | (Self::Opaque, Identifier::Text(_) | Identifier::Integer(_))
        )
    }
}

/// Parse decimal text: ASCII digits with an optional leading minus.
fn parse_decimal(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ============================================================================
// Predicate
// ============================================================================

/// Custom identifier check.
pub type MatchFn = Arc<dyn Fn(&Identifier) -> bool + Send + Sync>;

/// Closed set of identifier predicates, all dispatched through [`matches`](Self::matches).
#[derive(Clone)]
pub enum Predicate {
    /// Whole-value regex match against the identifier's text form.
    Pattern { source: String, regex: Regex },
    /// Inclusive integer range.
    Range(RangeInclusive<i64>),
    /// Enumerated members (already coerced).
    Set(FxHashSet<Identifier>),
    Custom(MatchFn),
}

impl Predicate {
    /// Compile a pattern. The pattern is anchored at both ends.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self::Pattern {
            source: source.to_string(),
            regex,
        })
    }

    pub fn matches(&self, id: &Identifier) -> bool {
        match self {
            Self::Pattern { regex, .. } => match id {
                Identifier::Text(s) => regex.is_match(s),
                Identifier::Symbol(s) => regex.is_match(s.as_str()),
                Identifier::Integer(n) => regex.is_match(&n.to_string()),
            },
            Self::Range(range) => id.as_integer().is_some_and(|n| range.contains(&n)),
            Self::Set(members) => members.contains(id),
            Self::Custom(check) => check(id),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern { source, .. } => f.debug_tuple("Pattern").field(source).finish(),
            Self::Range(range) => f.debug_tuple("Range").field(range).finish(),
            Self::Set(members) => f.debug_tuple("Set").field(members).finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

// ============================================================================
// IdentifierPolicy
// ============================================================================

/// Validation and coercion rule for one level.
#[derive(Debug, Clone)]
pub struct IdentifierPolicy {
    target: TargetKind,
    predicate: Option<Predicate>,
}

impl IdentifierPolicy {
    /// Policy for levels without identifiers.
    pub const fn none() -> Self {
        Self {
            target: TargetKind::None,
            predicate: None,
        }
    }

    pub const fn new(target: TargetKind, predicate: Predicate) -> Self {
        Self {
            target,
            predicate: Some(predicate),
        }
    }

    #[inline]
    pub const fn target(&self) -> TargetKind {
        self.target
    }

    #[inline]
    pub const fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Whether identifiers are expected at all.
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self.target, TargetKind::None)
    }

    /// Check that the policy is usable for `level`.
    pub fn validate(&self, level: &str) -> Result<(), ConfigError> {
        match (self.target, &self.predicate) {
            (TargetKind::None, None) => Ok(()),
            (TargetKind::None, Some(_)) => Err(ConfigError::predicate(
                level,
                "a level without identifiers cannot have a predicate",
            )),
            (_, None) => Err(ConfigError::predicate(
                level,
                "typed identifiers need a predicate",
            )),
            (_, Some(Predicate::Range(range))) if range.is_empty() => Err(ConfigError::predicate(
                level,
                format!("range {}..={} is empty", range.start(), range.end()),
            )),
            (_, Some(Predicate::Set(members))) if members.is_empty() => {
                Err(ConfigError::predicate(level, "set has no members"))
            }
            (target, Some(Predicate::Set(members))) => {
                match members.iter().find(|m| !target.accepts(m)) {
                    Some(member) => Err(ConfigError::predicate(
                        level,
                        format!("set member `{member}` is not a {target:?} identifier"),
                    )),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Coerce only. Absent input is valid only for identifier-less levels.
    pub fn coerce(&self, raw: Option<RawIdentifier>) -> Result<Option<Identifier>, String> {
        match (self.target, raw) {
            (TargetKind::None, None) => Ok(None),
            (_, None) => Err("identifier is required".to_string()),
            (target, Some(raw)) => target.coerce(raw).map(Some),
        }
    }

    /// Whether a coerced value passes the predicate.
    pub fn matches(&self, id: Option<&Identifier>) -> bool {
        match (&self.predicate, id) {
            (None, None) => true,
            (Some(predicate), Some(id)) => predicate.matches(id),
            _ => false,
        }
    }

    /// Coerce then validate, labelling failures with `level`.
    ///
    /// Symbols are interned only once they pass the predicate.
    pub fn admit(
        &self,
        level: &str,
        raw: Option<RawIdentifier>,
    ) -> Result<Option<Identifier>, AddressError> {
        let shown = raw.as_ref().map(ToString::to_string);
        let id = match (self.target, raw) {
            (TargetKind::Symbol, Some(raw)) => Ok(Some(Identifier::Symbol(Symbol::provisional(
                &raw.to_string(),
            )))),
            (_, raw) => self.coerce(raw),
        }
        .map_err(|reason| {
            AddressError::InvalidIdentifier(format!("invalid identifier for {level}: {reason}"))
        })?;

        if self.matches(id.as_ref()) {
            Ok(id.map(|id| match id {
                Identifier::Symbol(s) => Identifier::symbol(s.as_str()),
                other => other,
            }))
        } else {
            Err(AddressError::InvalidIdentifier(format!(
                "identifier `{}` does not correspond to expected format for {level}",
                shown.unwrap_or_default()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> IdentifierPolicy {
        IdentifierPolicy::new(TargetKind::Integer, Predicate::Range(1..=4))
    }

    #[test]
    fn test_integer_coercion_parses_decimal_text() {
        assert_eq!(
            TargetKind::Integer.coerce("12".into()),
            Ok(Identifier::Integer(12))
        );
        assert_eq!(
            TargetKind::Integer.coerce("-3".into()),
            Ok(Identifier::Integer(-3))
        );
        assert!(TargetKind::Integer.coerce("0x10".into()).is_err());
        assert!(TargetKind::Integer.coerce("1.5".into()).is_err());
        assert!(TargetKind::Integer.coerce("+4".into()).is_err());
        assert!(TargetKind::Integer.coerce("".into()).is_err());
    }

    #[test]
    fn test_string_coercion_stringifies_integers() {
        assert_eq!(
            TargetKind::String.coerce(42.into()),
            Ok(Identifier::text("42"))
        );
        assert_eq!(
            TargetKind::Opaque.coerce(42.into()),
            Ok(Identifier::Integer(42))
        );
    }

    #[test]
    fn test_coercion_is_idempotent() {
        let kinds = [
            TargetKind::String,
            TargetKind::Integer,
            TargetKind::Symbol,
            TargetKind::Opaque,
        ];
        let raws: [RawIdentifier; 3] = ["17".into(), 17.into(), "txt".into()];

        for kind in kinds {
            for raw in raws.iter().cloned() {
                let Ok(once) = kind.coerce(raw) else { continue };
                let twice = kind.coerce(RawIdentifier::from(&once)).unwrap();
                assert_eq!(once, twice, "{kind:?} coercion is not stable");
            }
        }
    }

    #[test]
    fn test_symbols_are_interned() {
        let a = Symbol::intern("holotheca");
        let b = Symbol::intern(&String::from("holotheca"));
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_ne!(a, Symbol::intern("theca"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let hex = Predicate::pattern("[a-z0-9]{1,8}").unwrap();
        assert!(hex.matches(&Identifier::text("2abz0")));
        assert!(!hex.matches(&Identifier::text("2ABZ0")));
        assert!(!hex.matches(&Identifier::text("2abz0.2")));
        assert!(!hex.matches(&Identifier::text("")));
        assert!(hex.matches(&Identifier::Integer(17)));
    }

    #[test]
    fn test_set_and_custom_predicates() {
        let set = Predicate::Set(["rb", "txt", "md"].map(Identifier::text).into_iter().collect());
        assert!(set.matches(&Identifier::text("txt")));
        assert!(!set.matches(&Identifier::text("rs")));

        let even = Predicate::Custom(Arc::new(|id| id.as_integer().is_some_and(|n| n % 2 == 0)));
        assert!(even.matches(&Identifier::Integer(4)));
        assert!(!even.matches(&Identifier::Integer(5)));
        assert!(!even.matches(&Identifier::text("4")));
    }

    #[test]
    fn test_admit_range() {
        let policy = wall();
        assert_eq!(
            policy.admit("Wall", Some("2".into())),
            Ok(Some(Identifier::Integer(2)))
        );

        let err = policy.admit("Wall", Some("8".into())).unwrap_err();
        assert!(err.is_invalid_identifier());
        assert!(err.to_string().contains("does not correspond to expected format"));

        let err = policy.admit("Wall", Some("two".into())).unwrap_err();
        assert!(err.is_invalid_identifier());

        let err = policy.admit("Wall", None).unwrap_err();
        assert!(err.is_invalid_identifier());
    }

    #[test]
    fn test_admit_none() {
        let policy = IdentifierPolicy::none();
        assert_eq!(policy.admit("root", None), Ok(None));
        assert!(policy.admit("root", Some(33.into())).is_err());
    }

    #[test]
    fn test_validate_rejects_unusable_policies() {
        assert!(wall().validate("wall").is_ok());
        assert!(IdentifierPolicy::none().validate("root").is_ok());

        let empty = IdentifierPolicy::new(TargetKind::Integer, Predicate::Range(5..=1));
        assert!(matches!(
            empty.validate("wall"),
            Err(ConfigError::Predicate { .. })
        ));

        let stray = IdentifierPolicy::new(TargetKind::None, Predicate::Range(1..=2));
        assert!(stray.validate("root").is_err());

        let mixed = IdentifierPolicy::new(
            TargetKind::String,
            Predicate::Set([Identifier::text("rb"), Identifier::Integer(3)].into_iter().collect()),
        );
        assert!(mixed.validate("ext").is_err());

        let no_members = IdentifierPolicy::new(TargetKind::String, Predicate::Set(FxHashSet::default()));
        assert!(no_members.validate("ext").is_err());
    }

    #[test]
    fn test_rejected_symbols_are_not_interned() {
        let policy = IdentifierPolicy::new(
            TargetKind::Symbol,
            Predicate::Set(["rb", "md"].map(Identifier::symbol).into_iter().collect()),
        );
        assert!(policy.admit("Ext", Some("policy-rejected-ext".into())).is_err());
        assert!(!Symbol::is_interned("policy-rejected-ext"));

        let id = policy.admit("Ext", Some("rb".into())).unwrap().unwrap();
        assert_eq!(id, Identifier::symbol("rb"));

        let named = IdentifierPolicy::new(TargetKind::Symbol, Predicate::pattern("[a-z]+").unwrap());
        assert!(named.admit("Name", Some("Policy-Upper".into())).is_err());
        assert!(!Symbol::is_interned("Policy-Upper"));

        let id = named.admit("Name", Some("policyadmitted".into())).unwrap().unwrap();
        assert!(Symbol::is_interned("policyadmitted"));
        assert_eq!(id, Identifier::symbol("policyadmitted"));
    }
}
