//! Random addresses.
//!
//! Identifiers are drawn uniformly per level: integer ranges with
//! `gen_range`, enumerated sets with `choose`, and hex names as 3260
//! uniform base-36 digits with leading zeros stripped (uniform over
//! `[0, 36^3260)`). Addresses are then built through
//! [`Locator::from_identifiers`], like any other caller would.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::address::Address;
use crate::error::{AddressError, LocateError};
use crate::hierarchy::{HEX_PATTERN, LevelRef, Predicate, RawIdentifier};
use crate::locator::{Located, Locator};

/// Number of base-36 digits in a full hex name.
pub const HEX_DIGITS: usize = 3260;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random walker over a locator's hierarchy.
pub struct Randomizer<R> {
    locator: Locator,
    rng: R,
}

impl<R: Rng> Randomizer<R> {
    pub fn new(locator: Locator, rng: R) -> Self {
        Self { locator, rng }
    }

    /// Random hex name in base 36, without leading zeros.
    pub fn hex_identifier(&mut self) -> String {
        let digits: String = (0..HEX_DIGITS)
            .map(|_| char::from(BASE36[self.rng.gen_range(0..BASE36.len())]))
            .collect();
        match digits.trim_start_matches('0') {
            "" => "0".to_string(),
            trimmed => trimmed.to_string(),
        }
    }

    /// Random identifier accepted by `level`.
    pub fn identifier(&mut self, level: &LevelRef) -> Result<RawIdentifier, AddressError> {
        match level.policy().predicate() {
            Some(Predicate::Range(range)) => Ok(RawIdentifier::Integer(
                self.rng.gen_range(range.clone()),
            )),
            Some(Predicate::Set(members)) => {
                // Hash order is not stable across runs for symbols
                let mut members: Vec<_> = members.iter().collect();
                members.sort_by_key(|member| member.to_string());
                members
                    .choose(&mut self.rng)
                    .map(|member| RawIdentifier::from(*member))
                    .ok_or_else(|| cannot_synthesize(level))
            }
            Some(Predicate::Pattern { source, .. }) if source == HEX_PATTERN => {
                Ok(RawIdentifier::Text(self.hex_identifier()))
            }
            _ => Err(cannot_synthesize(level)),
        }
    }

    /// Random address `depth` ranks below the root.
    pub fn address(&mut self, depth: usize) -> Result<Address, LocateError> {
        let hierarchy = self.locator.hierarchy().clone();
        if depth > hierarchy.leaf_depth() {
            return Err(AddressError::InvalidHierarchy(format!(
                "depth {depth} is below the leaf, the deepest level is {}",
                hierarchy.leaf_depth()
            ))
            .into());
        }

        let mut identifiers = Vec::with_capacity(depth + 1);
        for level in (0..=depth).filter_map(|d| hierarchy.level(d)) {
            if !level.policy().is_none() {
                identifiers.push(self.identifier(&level)?);
            }
        }

        match self.locator.from_identifiers(identifiers, None)? {
            Located::Address(address) => Ok(address),
            Located::Text(_) => Err(AddressError::InvalidHierarchy(
                "expected an address, got text".to_string(),
            )
            .into()),
        }
    }

    /// Random leaf address.
    pub fn leaf(&mut self) -> Result<Address, LocateError> {
        self.address(self.locator.hierarchy().leaf_depth())
    }
}

fn cannot_synthesize(level: &LevelRef) -> AddressError {
    AddressError::InvalidIdentifier(format!(
        "cannot synthesize identifiers for {}",
        level.label()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Unavailable;
    use crate::hierarchy::{Hierarchy, Identifier, LevelConfig, PredicateSpec, TargetKind};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn randomizer(seed: u64) -> Randomizer<StdRng> {
        let locator = Locator::new(Hierarchy::babel(), Arc::new(Unavailable)).unwrap();
        Randomizer::new(locator, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_hex_identifier_shape() {
        let mut randomizer = randomizer(7);
        for _ in 0..3 {
            let hex = randomizer.hex_identifier();
            assert!(!hex.is_empty() && hex.len() <= HEX_DIGITS);
            assert!(hex.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
            assert!(hex == "0" || !hex.starts_with('0'));
        }
    }

    #[test]
    fn test_random_leaf_is_valid() {
        let mut randomizer = randomizer(42);
        for _ in 0..5 {
            let page = randomizer.leaf().unwrap();
            assert!(page.is_leaf());
            let ids = page.identifiers();
            assert_eq!(ids.len(), 5);
            assert!((1..=4).contains(&ids[1].as_integer().unwrap()));
            assert!((1..=5).contains(&ids[2].as_integer().unwrap()));
            assert!((1..=32).contains(&ids[3].as_integer().unwrap()));
            assert!((1..=410).contains(&ids[4].as_integer().unwrap()));
        }
    }

    #[test]
    fn test_same_seed_same_address() {
        let a = randomizer(3).address(3).unwrap();
        let b = randomizer(3).address(3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.level().name(), "shelf");
    }

    #[test]
    fn test_address_depth_bounds() {
        let mut randomizer = randomizer(1);
        assert!(randomizer.address(0).unwrap().is_root());
        let err = randomizer.address(6).unwrap_err();
        assert!(err.as_address_error().unwrap().is_invalid_hierarchy());
    }

    #[test]
    fn test_sets_and_unsupported_levels() {
        let hierarchy = (LevelConfig::new("root")
            >> LevelConfig::new("ext")
                .identifier(TargetKind::Symbol, PredicateSpec::set(["rb", "txt", "md"]))
            >> LevelConfig::new("name")
                .identifier(TargetKind::String, PredicateSpec::pattern("[a-z]+")))
        .build()
        .unwrap();
        let locator = Locator::new(hierarchy, Arc::new(Unavailable)).unwrap();
        let mut randomizer = Randomizer::new(locator, StdRng::seed_from_u64(9));

        let ext = randomizer.address(1).unwrap();
        let id = ext.identifier().unwrap();
        assert!(
            ["rb", "txt", "md"]
                .iter()
                .any(|s| *id == Identifier::symbol(s))
        );

        let err = randomizer.address(2).unwrap_err();
        assert!(err.as_address_error().unwrap().is_invalid_identifier());
    }
}
