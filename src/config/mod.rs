//! Configuration management for `holotheca.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section.rs     # [cache], [locator], [content], [[level]]
//! ├── util.rs        # find_config_file, expand_tilde
//! └── mod.rs         # HolothecaConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section       | Purpose                                         |
//! |---------------|-------------------------------------------------|
//! | `[cache]`     | Page cache pressure limits                      |
//! | `[locator]`   | Error policy and custom reference grammar       |
//! | `[content]`   | Directory of saved pages                        |
//! | `[[level]]`   | Custom hierarchy; the Library of Babel otherwise |

mod section;
mod util;

pub use section::{CacheConfig, ContentConfig, LevelSection, LocatorConfig, SetMember};
pub use util::{expand_tilde, find_config_file};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{CachingProvider, PressureCache};
use crate::content::{ContentProvider, DirectoryProvider, Unavailable};
use crate::error::ConfigError;
use crate::hierarchy::Hierarchy;
use crate::locator::{Locator, ReferenceGrammar};
use crate::log;

/// Default config file name.
pub const CONFIG_FILE: &str = "holotheca.toml";

/// Root configuration structure representing `holotheca.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolothecaConfig {
    /// Path the configuration was read from (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    pub cache: CacheConfig,

    pub locator: LocatorConfig,

    pub content: ContentConfig,

    /// Custom hierarchy levels, in any order.
    #[serde(rename = "level")]
    pub levels: Vec<LevelSection>,
}

impl HolothecaConfig {
    /// Load `config_name`, searching upward from the current directory.
    ///
    /// A missing file yields the built-in defaults.
    pub fn load(config_name: &Path) -> Result<Self, ConfigError> {
        match find_config_file(config_name) {
            Some(path) => Self::from_path(&path),
            None => {
                crate::debug!("config"; "{} not found, using defaults", config_name.display());
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a file, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse TOML content, ignoring unknown fields silently.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::parse_with_ignored(content)?.0)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Build the configured hierarchy, or the Library of Babel when no
    /// `[[level]]` is declared.
    pub fn hierarchy(&self) -> Result<Hierarchy, ConfigError> {
        if self.levels.is_empty() {
            return Ok(Hierarchy::babel());
        }

        let mut builder = Hierarchy::builder();
        for section in &self.levels {
            builder.level(section.to_level()?)?;
        }
        for section in &self.levels {
            if let Some(parent) = &section.parent {
                builder.link(parent, &section.name)?;
            }
        }
        builder.build()
    }

    /// Content source: saved pages behind a pressure cache, or nothing.
    pub fn content_provider(&self) -> Arc<dyn ContentProvider> {
        match self.content.dir() {
            Some(dir) => Arc::new(CachingProvider::new(
                DirectoryProvider::new(dir),
                PressureCache::with_overpressure(self.cache.max_pressure, self.cache.overpressure),
            )),
            None => Arc::new(Unavailable),
        }
    }

    /// Locator over the configured hierarchy, grammar and error policy.
    pub fn locator(&self, content: Arc<dyn ContentProvider>) -> Result<Locator, ConfigError> {
        let hierarchy = self.hierarchy()?;
        let locator = match &self.locator.grammar {
            Some(grammar) => {
                Locator::with_parts(hierarchy, ReferenceGrammar::new(grammar)?, content)
            }
            None => Locator::new(hierarchy, content)?,
        };
        Ok(locator.with_error_policy(self.locator.errors))
    }
}
