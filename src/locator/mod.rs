//! Reference resolution.
//!
//! A reference is a flat string such as `2abz0.2.4.5.12` or
//! `2abz0.2.4.5.12.[5-28,30]`. The [`Locator`] matches it against a
//! [`ReferenceGrammar`], digs an [`Address`] out of the hierarchy, and for
//! ranged references extracts the selected characters of the leaf text.
//!
//! # Error policy
//!
//! By default ([`ErrorPolicy::Propagate`]) hierarchy and identifier errors
//! come out of [`Locator::call`] with their precise kind. With
//! [`ErrorPolicy::Normalize`] they are folded into
//! [`LocateError::InvalidReference`]. Content errors are never folded.

mod grammar;
mod range;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use grammar::{ParsedReference, ReferenceGrammar};
pub use range::TextRange;

use crate::address::Address;
use crate::content::{ContentProvider, LeafContent};
use crate::error::{AddressError, ConfigError, LocateError};
use crate::hierarchy::{Hierarchy, RawIdentifier};

/// How [`Locator::call`] reports hierarchy and identifier failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Keep the precise [`AddressError`].
    #[default]
    Propagate,
    /// Report everything as an invalid reference.
    Normalize,
}

/// Result of resolving a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Address(Address),
    /// Extracted leaf text.
    Text(String),
}

impl Located {
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(addr) => Some(addr),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Address(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Address(_) => None,
        }
    }
}

impl fmt::Display for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => fmt::Display::fmt(addr, f),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Resolves references against one hierarchy.
#[derive(Clone)]
pub struct Locator {
    hierarchy: Hierarchy,
    grammar: ReferenceGrammar,
    content: Arc<dyn ContentProvider>,
    errors: ErrorPolicy,
}

impl Locator {
    /// Locator with the standard grammar for `hierarchy`.
    pub fn new(
        hierarchy: Hierarchy,
        content: Arc<dyn ContentProvider>,
    ) -> Result<Self, ConfigError> {
        let grammar = ReferenceGrammar::standard(&hierarchy)?;
        Ok(Self::with_parts(hierarchy, grammar, content))
    }

    /// Locator with a caller-supplied grammar.
    pub fn with_parts(
        hierarchy: Hierarchy,
        grammar: ReferenceGrammar,
        content: Arc<dyn ContentProvider>,
    ) -> Self {
        Self {
            hierarchy,
            grammar,
            content,
            errors: ErrorPolicy::default(),
        }
    }

    pub fn with_grammar(mut self, grammar: ReferenceGrammar) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn with_error_policy(mut self, errors: ErrorPolicy) -> Self {
        self.errors = errors;
        self
    }

    #[inline]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    #[inline]
    pub fn grammar(&self) -> &ReferenceGrammar {
        &self.grammar
    }

    #[inline]
    pub const fn error_policy(&self) -> ErrorPolicy {
        self.errors
    }

    /// Split a reference without resolving it.
    pub fn parse(&self, reference: &str) -> Result<ParsedReference, LocateError> {
        let parsed = self
            .grammar
            .parse(reference)
            .map_err(|reason| LocateError::invalid_reference(reference, reason))?;

        if let Some(zero) = parsed
            .ranges
            .iter()
            .flatten()
            .find(|range| range.to_zero_based().is_none())
        {
            return Err(LocateError::invalid_reference(
                reference,
                format!("position in `{zero}` is out of range, positions start at 1"),
            ));
        }
        Ok(parsed)
    }

    /// Resolve a reference to an address, or to leaf text if it has a range.
    pub fn call(&self, reference: &str) -> Result<Located, LocateError> {
        let parsed = self.parse(reference)?;
        let located = self
            .from_identifiers(parsed.identifiers, parsed.ranges.as_deref())
            .map_err(|err| self.apply_policy(reference, err))?;

        crate::debug!("locate"; "{} -> {}", reference, located);
        Ok(located)
    }

    /// Resolve pre-split identifiers, bypassing the grammar.
    ///
    /// Errors always keep their precise kind here.
    pub fn from_identifiers<I>(
        &self,
        identifiers: I,
        ranges: Option<&[TextRange]>,
    ) -> Result<Located, LocateError>
    where
        I: IntoIterator,
        I::Item: Into<RawIdentifier>,
    {
        let address = self.address(identifiers)?;
        match ranges {
            None => Ok(Located::Address(address)),
            Some(ranges) => self.extract(&address, ranges).map(Located::Text),
        }
    }

    /// Dig from a fresh root. The first identifier belongs to the root when
    /// the root level takes one.
    pub fn address<I>(&self, identifiers: I) -> Result<Address, AddressError>
    where
        I: IntoIterator,
        I::Item: Into<RawIdentifier>,
    {
        let level = self.hierarchy.root();
        let mut identifiers = identifiers.into_iter().map(Into::into);
        let root = if level.policy().is_none() {
            level.construct(None, None)?
        } else {
            level.construct(None, identifiers.next())?
        };
        root.dig(identifiers)
    }

    /// Leaf content of `address`.
    pub fn content(&self, address: &Address) -> Result<Arc<LeafContent>, LocateError> {
        if !address.is_leaf() {
            return Err(AddressError::InvalidHierarchy(format!(
                "ranges are only valid on leaf content, {} is not a leaf",
                address.level().label()
            ))
            .into());
        }
        Ok(self.content.fetch(&address.to_url())?)
    }

    /// Concatenate the characters selected by `ranges`, in order.
    pub fn extract(&self, address: &Address, ranges: &[TextRange]) -> Result<String, LocateError> {
        let content = self.content(address)?;
        select(&address.to_string(), &content.text, ranges)
    }

    fn apply_policy(&self, reference: &str, err: LocateError) -> LocateError {
        match (self.errors, err) {
            (ErrorPolicy::Normalize, LocateError::Address(inner)) => {
                LocateError::invalid_reference(reference, inner.to_string())
            }
            (_, err) => err,
        }
    }
}

/// Characters of `text` selected by `ranges`. `source` names the page in
/// errors.
pub fn select(source: &str, text: &str, ranges: &[TextRange]) -> Result<String, LocateError> {
    range::extract(text, ranges).map_err(|bad| {
        LocateError::invalid_reference(
            source,
            format!("position in `{bad}` is out of range, positions start at 1"),
        )
    })
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("hierarchy", &self.hierarchy)
            .field("grammar", &self.grammar.as_str())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
