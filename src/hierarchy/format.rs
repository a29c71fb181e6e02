//! Per-level URL-part formatters.
//!
//! Templates are plain text with at most a handful of placeholders:
//!
//! | Template      | Identifier `5` renders as |
//! |---------------|---------------------------|
//! | `-w{id}`      | `-w5`                     |
//! | `-v{id:02}`   | `-v05`                    |
//! | `{{id}}`      | `{id}` (escaped braces)   |
//!
//! Separators belong to the template itself; nothing is inserted between
//! the parts of an address when they are joined.

use std::fmt;
use std::sync::Arc;

use super::Identifier;

/// Custom formatter.
pub type FormatFn = Arc<dyn Fn(Option<&Identifier>) -> String + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// Identifier, left-padded with zeros to `width` characters.
    Identifier { width: usize },
}

/// URL-part formatter for one level.
#[derive(Clone)]
pub struct UrlFormat(Repr);

#[derive(Clone)]
enum Repr {
    Template {
        source: String,
        segments: Vec<Segment>,
    },
    Custom(FormatFn),
}

impl UrlFormat {
    /// Parse a template. Returns a reason on failure.
    pub fn template(source: &str) -> Result<Self, String> {
        let segments = parse_template(source)?;
        Ok(Self(Repr::Template {
            source: source.to_string(),
            segments,
        }))
    }

    /// A fixed fragment that ignores the identifier.
    pub fn literal(text: &str) -> Self {
        Self(Repr::Template {
            source: text.replace('{', "{{").replace('}', "}}"),
            segments: vec![Segment::Literal(text.to_string())],
        })
    }

    pub fn custom(format: impl Fn(Option<&Identifier>) -> String + Send + Sync + 'static) -> Self {
        Self(Repr::Custom(Arc::new(format)))
    }

    pub fn format(&self, id: Option<&Identifier>) -> String {
        match &self.0 {
            Repr::Template { segments, .. } => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => out.push_str(text),
                        Segment::Identifier { width } => {
                            if let Some(id) = id {
                                out.push_str(&pad(id, *width));
                            }
                        }
                    }
                }
                out
            }
            Repr::Custom(format) => format(id),
        }
    }
}

impl Default for UrlFormat {
    /// The bare identifier.
    fn default() -> Self {
        Self(Repr::Template {
            source: "{id}".to_string(),
            segments: vec![Segment::Identifier { width: 0 }],
        })
    }
}

impl fmt::Debug for UrlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Template { source, .. } => f.debug_tuple("Template").field(source).finish(),
            Repr::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

fn pad(id: &Identifier, width: usize) -> String {
    match id {
        Identifier::Integer(n) => format!("{n:0width$}"),
        other => {
            let text = other.to_string();
            format!("{text:0>width$}")
        }
    }
}

fn parse_template(source: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut placeholder = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => placeholder.push(c),
                        None => return Err(format!("unclosed placeholder in `{source}`")),
                    }
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(parse_placeholder(&placeholder)?);
            }
            '}' => return Err(format!("unmatched `}}` in `{source}`")),
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// `id` or `id:0N`.
fn parse_placeholder(placeholder: &str) -> Result<Segment, String> {
    let (name, spec) = match placeholder.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (placeholder, None),
    };
    if name != "id" {
        return Err(format!("unknown placeholder `{{{placeholder}}}`, expected `{{id}}`"));
    }

    let width = match spec {
        None => 0,
        Some(spec) => spec
            .strip_prefix('0')
            .and_then(|w| w.parse::<usize>().ok())
            .ok_or_else(|| format!("invalid width `{spec}`, expected e.g. `02`"))?,
    };
    Ok(Segment::Identifier { width })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_renders_identifier() {
        let wall = UrlFormat::template("-w{id}").unwrap();
        assert_eq!(wall.format(Some(&Identifier::Integer(2))), "-w2");

        let volume = UrlFormat::template("-v{id:02}").unwrap();
        assert_eq!(volume.format(Some(&Identifier::Integer(5))), "-v05");
        assert_eq!(volume.format(Some(&Identifier::Integer(16))), "-v16");
        assert_eq!(volume.format(Some(&Identifier::text("7"))), "-v07");
    }

    #[test]
    fn test_template_without_identifier() {
        let root = UrlFormat::template("https://libraryofbabel.info/book.cgi?").unwrap();
        assert_eq!(root.format(None), "https://libraryofbabel.info/book.cgi?");

        assert_eq!(UrlFormat::default().format(None), "");
        assert_eq!(
            UrlFormat::default().format(Some(&Identifier::text("2abz0"))),
            "2abz0"
        );
    }

    #[test]
    fn test_escaped_braces() {
        let fmt = UrlFormat::template("{{id}}={id}").unwrap();
        assert_eq!(fmt.format(Some(&Identifier::Integer(3))), "{id}=3");

        let lit = UrlFormat::literal("{raw}");
        assert_eq!(lit.format(Some(&Identifier::Integer(3))), "{raw}");
    }

    #[test]
    fn test_invalid_templates() {
        assert!(UrlFormat::template("-w{id").is_err());
        assert!(UrlFormat::template("-w}").is_err());
        assert!(UrlFormat::template("-w{page}").is_err());
        assert!(UrlFormat::template("-v{id:2}").is_err());
        assert!(UrlFormat::template("-v{id:0x}").is_err());
    }

    #[test]
    fn test_custom_format() {
        let fmt = UrlFormat::custom(|id| format!(".{}", id.map(ToString::to_string).unwrap_or_default()));
        assert_eq!(fmt.format(Some(&Identifier::text("rb"))), ".rb");
        assert_eq!(fmt.format(None), ".");
    }
}
