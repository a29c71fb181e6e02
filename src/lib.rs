//! Holotheca - hierarchical address resolver for the Library of Babel.
//!
//! A [`Hierarchy`] is a fixed chain of levels (root → … → leaf), each with
//! its own identifier policy and URL fragment. An [`Address`] is an
//! immutable node in that chain. The [`Locator`] turns flat references such
//! as `2abz0.2.4.5.12.[5-28,30]` into addresses, or into the selected
//! characters of a leaf's text.
//!
//! ```ignore
//! use holotheca::{Hierarchy, Locator, content::Unavailable};
//!
//! let locator = Locator::new(Hierarchy::babel(), Arc::new(Unavailable))?;
//! let page = locator.call("2abz0.2.4.5.12")?;
//! assert_eq!(
//!     page.as_address().unwrap().to_url(),
//!     "https://libraryofbabel.info/book.cgi?2abz0-w2-s4-v05:12"
//! );
//! ```

pub mod logger;

pub mod address;
pub mod cache;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod hierarchy;
pub mod interpreter;
pub mod locator;
pub mod randomizer;

pub use address::Address;
pub use cache::{CachingProvider, PressureCache};
pub use config::HolothecaConfig;
pub use content::{ContentProvider, LeafContent};
pub use error::{AddressError, ConfigError, LocateError};
pub use hierarchy::{Hierarchy, LevelConfig, LevelRef, PredicateSpec, TargetKind};
pub use interpreter::Interpreter;
pub use locator::{ErrorPolicy, Located, Locator};
pub use randomizer::Randomizer;
