//! Page HTML extraction.
//!
//! A leaf page carries its title in `<title>` and its text in
//! `<pre id="textblock">`. The text is hard-wrapped; newlines are removed
//! so that character positions count only page content.

use std::borrow::Cow;

use super::LeafContent;

/// Extract title and text from a page document.
///
/// Returns `None` when the text block is missing.
pub fn extract(html: &str) -> Option<LeafContent> {
    let dom = tl::parse(html, tl::ParserOptions::default().track_ids()).ok()?;
    let parser = dom.parser();

    let title = dom
        .query_selector("title")
        .and_then(|mut nodes| nodes.next())
        .and_then(|handle| handle.get(parser))
        .map(|node| unescape(node.inner_text(parser).trim()).into_owned())
        .unwrap_or_default();

    let text = dom
        .get_element_by_id("textblock")
        .and_then(|handle| handle.get(parser))
        .map(|node| unescape(&node.inner_text(parser).replace(['\n', '\r'], "")).into_owned())?;

    Some(LeafContent { title, text })
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let entity = rest[1..]
            .find(';')
            .filter(|&end| end <= 10)
            .map(|end| &rest[1..=end]);

        match entity.and_then(decode_entity) {
            Some(c) => {
                result.push(c);
                // `&` + entity + `;`
                rest = &rest[entity.map_or(0, str::len) + 2..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);

    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        s => {
            let code = s.strip_prefix('#')?;
            let code = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>jbcde 1</title></head>
<body>
<div class="bookrealign">
<pre id="textblock">abcdefghijklmnopqrstuvwxyz12340987654321
1234567890,. 1234567890,. 12340987654321</pre>
</div>
</body>
</html>"#;

    #[test]
    fn test_extract_page() {
        let content = extract(PAGE).unwrap();
        assert_eq!(content.title, "jbcde 1");
        assert_eq!(
            content.text,
            "abcdefghijklmnopqrstuvwxyz123409876543211234567890,. 1234567890,. 12340987654321"
        );
        assert_eq!(content.book_title(), Some("jbcde"));
    }

    #[test]
    fn test_extract_without_text_block() {
        assert!(extract("<html><head><title>x</title></head><body></body></html>").is_none());
    }

    #[test]
    fn test_extract_unescapes_entities() {
        let html = r#"<title>a &amp; b</title><pre id="textblock">x&lt;y&#44;z</pre>"#;
        let content = extract(html).unwrap();
        assert_eq!(content.title, "a & b");
        assert_eq!(content.text, "x<y,z");
    }

    #[test]
    fn test_unescape() {
        assert!(matches!(unescape("plain"), Cow::Borrowed("plain")));
        assert_eq!(unescape("&#x41;&#66;&quot;"), "AB\"");
        assert_eq!(unescape("fish & chips"), "fish & chips");
        assert_eq!(unescape("&bogus; &amp"), "&bogus; &amp");
    }
}
