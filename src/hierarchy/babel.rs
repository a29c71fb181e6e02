//! Built-in Library of Babel hierarchy.
//!
//! ```text
//! https://libraryofbabel.info/book.cgi?2abz0-w2-s4-v05:12
//!                                      ^hex  ^wall ^volume
//!                                               ^shelf ^page
//! ```

use std::sync::LazyLock;

use super::builder::Chain;
use super::level::{LevelConfig, PredicateSpec};
use super::policy::TargetKind;
use super::Hierarchy;

/// Base URL of a page; the root level's URL part.
pub const BOOK_URL: &str = "https://libraryofbabel.info/book.cgi?";

/// Hex names: up to 3260 base-36 digits.
pub const HEX_PATTERN: &str = "[a-z0-9]{1,3260}";

static BABEL: LazyLock<Hierarchy> =
    LazyLock::new(|| chain().build().expect("built-in hierarchy is valid"));

pub(super) fn hierarchy() -> Hierarchy {
    BABEL.clone()
}

fn numbered(name: &str, title: &str, max: i64, url: &str) -> LevelConfig {
    LevelConfig::new(name)
        .title(title)
        .identifier(TargetKind::Integer, PredicateSpec::range(1..=max))
        .url(url)
}

fn chain() -> Chain {
    LevelConfig::new("library").url(BOOK_URL)
        >> LevelConfig::new("hex")
            .title("Hex")
            .identifier(TargetKind::String, PredicateSpec::pattern(HEX_PATTERN))
            .url("{id}")
        >> numbered("wall", "Wall", 4, "-w{id}")
        >> numbered("shelf", "Shelf", 5, "-s{id}")
        >> numbered("volume", "Volume", 32, "-v{id:02}")
        >> numbered("page", "Page", 410, ":{id}")
}
