//! Reference grammars.
//!
//! A grammar is a regex exposing three named captures:
//!
//! | Capture       | Meaning                                        |
//! |---------------|------------------------------------------------|
//! | `identifiers` | compound identifier span, e.g. `2abz0.2.4.5.12` |
//! | `separator`   | separator used inside that span, e.g. `.`      |
//! | `range`       | optional range span, e.g. `.7` or `.[5-28,30]` |
//!
//! The range span may carry a leading `.` and surrounding brackets; both
//! are stripped before the list is parsed.

use regex::Regex;

use super::range::TextRange;
use crate::error::ConfigError;
use crate::hierarchy::{HEX_PATTERN, Hierarchy};

const CAPTURES: [&str; 3] = ["identifiers", "separator", "range"];

/// Range suffix: `.N` or `.[list]` (the dot is optional before brackets).
const RANGE_PATTERN: &str =
    r"\.[0-9]+|\.?\[(?:[0-9]+-[0-9]+|[0-9]+)(?:,\s*(?:[0-9]+-[0-9]+|[0-9]+))*\]";

/// Compiled reference grammar.
#[derive(Debug, Clone)]
pub struct ReferenceGrammar {
    regex: Regex,
}

/// Pieces of a matched reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub identifiers: Vec<String>,
    pub ranges: Option<Vec<TextRange>>,
}

impl ReferenceGrammar {
    /// Compile a custom grammar. Fails if any required capture is missing.
    ///
    /// The pattern always has to match the whole reference.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|err| ConfigError::Grammar(err.to_string()))?;
        let names: Vec<_> = regex.capture_names().flatten().collect();
        let missing: Vec<_> = CAPTURES
            .iter()
            .filter(|capture| !names.contains(*capture) && !declares(pattern, capture))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Grammar(format!(
                "missing named captures: {}",
                missing.join(", ")
            )));
        }
        Ok(Self { regex })
    }

    pub fn from_regex(regex: &Regex) -> Result<Self, ConfigError> {
        Self::new(regex.as_str())
    }

    /// Grammar for a hierarchy whose root carries no identifier: one hex-like
    /// compound, then up to `leaf_depth - 1` decimal compounds.
    pub fn standard(hierarchy: &Hierarchy) -> Result<Self, ConfigError> {
        let separator = match hierarchy.leaf_depth().saturating_sub(1) {
            0 => "(?P<separator>)".to_string(),
            repeats => format!(r"(?:(?P<separator>\.)[0-9]+){{0,{repeats}}}"),
        };
        Self::new(&format!(
            r"(?P<identifiers>{HEX_PATTERN}{separator})(?P<range>{RANGE_PATTERN})?"
        ))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match a whole reference. `Err` carries the reason for rejection.
    pub fn parse(&self, reference: &str) -> Result<ParsedReference, String> {
        let caps = self
            .regex
            .captures(reference)
            .ok_or_else(|| "does not match the reference grammar".to_string())?;

        let span = caps.name("identifiers").map_or("", |m| m.as_str());
        let identifiers = match caps.name("separator").map(|m| m.as_str()) {
            Some(sep) if !sep.is_empty() => span.split(sep).map(str::to_string).collect(),
            _ if span.is_empty() => Vec::new(),
            _ => vec![span.to_string()],
        };

        let ranges = match caps.name("range").map(|m| m.as_str()) {
            Some(range) if !range.is_empty() => Some(TextRange::parse_list(strip_range(range))?),
            _ => None,
        };

        Ok(ParsedReference { identifiers, ranges })
    }
}

/// Whether `pattern` names `capture`, even under a `{0}` repetition that
/// the regex compiler elides.
fn declares(pattern: &str, capture: &str) -> bool {
    [format!("(?P<{capture}>"), format!("(?<{capture}>")]
        .iter()
        .any(|group| pattern.contains(group.as_str()))
}

fn strip_range(range: &str) -> &str {
    let range = range.strip_prefix('.').unwrap_or(range);
    range
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .unwrap_or(range)
}
