//! Offline provider backed by a directory of saved pages.
//!
//! Each page is stored under the fingerprint of its URL:
//!
//! ```text
//! <root>/
//! ├── 9c0f6d1e2b3a4c5d.html   # saved page, extracted with `html::extract`
//! └── 0123456789abcdef.txt    # first line title, rest text
//! ```

use std::fs;
use std::hash::Hasher;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHasher;

use super::{ContentError, ContentProvider, LeafContent, html};

/// 16-hex-digit FxHash of a URL.
#[inline]
pub fn fingerprint(url: &str) -> String {
    let mut hasher = FxHasher::default();
    hasher.write(url.as_bytes());
    format!("{:016x}", hasher.finish())
}

/// Reads pages from `<root>/<fingerprint>.{html,txt}`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where an HTML copy of `url` is expected.
    pub fn html_path(&self, url: &str) -> PathBuf {
        self.root.join(format!("{}.html", fingerprint(url)))
    }

    /// Where a plain-text copy of `url` is expected.
    pub fn text_path(&self, url: &str) -> PathBuf {
        self.root.join(format!("{}.txt", fingerprint(url)))
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ContentError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(ContentError::Io(path.to_path_buf(), err)),
    }
}

/// First line is the title, remaining lines are the text.
fn parse_text(content: &str) -> LeafContent {
    let (title, text) = content.split_once('\n').unwrap_or((content, ""));
    LeafContent {
        title: title.trim_end_matches('\r').to_string(),
        text: text.replace(['\n', '\r'], ""),
    }
}

impl ContentProvider for DirectoryProvider {
    fn fetch(&self, url: &str) -> Result<Arc<LeafContent>, ContentError> {
        if let Some(page) = read_optional(&self.html_path(url))? {
            let content =
                html::extract(&page).ok_or_else(|| ContentError::MissingText(url.to_string()))?;
            crate::debug!("content"; "read {} from html", url);
            return Ok(Arc::new(content));
        }

        if let Some(page) = read_optional(&self.text_path(url))? {
            crate::debug!("content"; "read {} from text", url);
            return Ok(Arc::new(parse_text(&page)));
        }

        Err(ContentError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://libraryofbabel.info/book.cgi?2abz0-w2-s4-v05:12";

    #[test]
    fn test_fingerprint_is_stable() {
        let fp = fingerprint(URL);
        assert_eq!(fp.len(), 16);
        assert!(fp.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(fp, fingerprint(URL));
        assert_ne!(fp, fingerprint("https://libraryofbabel.info/book.cgi?2abz0-w2-s4-v05:13"));
    }

    #[test]
    fn test_fetch_text_page() {
        let dir = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(dir.path());
        fs::write(provider.text_path(URL), "jbcde 1\nabc\ndef\r\n").unwrap();

        let content = provider.fetch(URL).unwrap();
        assert_eq!(content.title, "jbcde 1");
        assert_eq!(content.text, "abcdef");
    }

    #[test]
    fn test_fetch_html_page_wins() {
        let dir = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(dir.path());
        fs::write(provider.text_path(URL), "text title\nxyz").unwrap();
        fs::write(
            provider.html_path(URL),
            r#"<title>html title</title><pre id="textblock">ab
cd</pre>"#,
        )
        .unwrap();

        let content = provider.fetch(URL).unwrap();
        assert_eq!(content.title, "html title");
        assert_eq!(content.text, "abcd");
    }

    #[test]
    fn test_fetch_errors() {
        let dir = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(dir.path());
        assert!(matches!(provider.fetch(URL), Err(ContentError::NotFound(_))));

        fs::write(provider.html_path(URL), "<title>no text</title>").unwrap();
        assert!(matches!(
            provider.fetch(URL),
            Err(ContentError::MissingText(_))
        ));
    }
}
