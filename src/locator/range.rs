//! Text ranges in references.
//!
//! Ranges are 1-based and inclusive on the outside (`5-28`, `30`) and
//! 0-based half-open on the inside. Extraction counts characters, not bytes.

use std::fmt;
use std::ops::Range;

/// One entry of a range list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRange {
    /// A single character.
    Index(usize),
    /// Inclusive span.
    Span { start: usize, end: usize },
}

impl TextRange {
    pub const fn span(start: usize, end: usize) -> Self {
        Self::Span { start, end }
    }

    /// 0-based half-open character span. `None` for position `0`, which
    /// does not exist in 1-based numbering.
    pub fn to_zero_based(self) -> Option<Range<usize>> {
        let (start, end) = match self {
            Self::Index(i) => (i, i),
            Self::Span { start, end } => (start, end),
        };
        if start == 0 || end == 0 {
            return None;
        }
        // Reversed spans select nothing
        Some(start - 1..end.max(start - 1))
    }

    /// Parse a range list such as `5-28, 30` (brackets already stripped).
    pub fn parse_list(list: &str) -> Result<Vec<Self>, String> {
        list.split(',').map(|item| Self::parse(item.trim())).collect()
    }

    fn parse(item: &str) -> Result<Self, String> {
        let number = |s: &str| {
            s.parse::<usize>()
                .map_err(|_| format!("`{s}` is not a position"))
        };
        match item.split_once('-') {
            Some((start, end)) => Ok(Self::span(number(start)?, number(end)?)),
            None => Ok(Self::Index(number(item)?)),
        }
    }

    /// Characters selected from `text`; out-of-bounds parts are clamped.
    pub fn slice(self, text: &str) -> Option<String> {
        let range = self.to_zero_based()?;
        Some(
            text.chars()
                .skip(range.start)
                .take(range.end - range.start)
                .collect(),
        )
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Span { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

/// Concatenate the selected characters, in list order.
///
/// Fails on the first position `0`.
pub fn extract(text: &str, ranges: &[TextRange]) -> Result<String, TextRange> {
    let mut out = String::new();
    for range in ranges {
        out.push_str(&range.slice(text).ok_or(*range)?);
    }
    Ok(out)
}
