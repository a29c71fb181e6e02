//! Bounded caches.
//!
//! - [`PressureCache`]: write-weighted map used for addresses and pages
//! - [`CachingProvider`]: memoizes leaf content by URL

mod pressure;
mod provider;

pub use pressure::{DEFAULT_OVERPRESSURE, PressureCache};
pub use provider::CachingProvider;
