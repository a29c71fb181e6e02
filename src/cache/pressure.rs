//! Pressure-weighted cache.
//!
//! Every write adds one unit of pressure to its entry and to the total;
//! reads add nothing. When a new key arrives while the total is at or
//! above `max_pressure + overpressure`, the cache compacts:
//!
//! 1. every entry decays in proportion to the overshoot: its pressure is
//!    scaled by `max_pressure / total`, rounded up;
//! 2. entries whose pressure falls to zero are dropped;
//! 3. if the total is still at or above `max_pressure`, the single entry
//!    with the lowest pressure is evicted (first-seen wins ties).
//!
//! Rounding up keeps every written entry at one unit or more, so a run of
//! single writes loses one entry per compaction instead of all of them,
//! and the entry count stays between `max_pressure` and
//! `max_pressure + overpressure`. Rewritten keys keep their lead.

use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Default slack above `max_pressure` before compaction.
pub const DEFAULT_OVERPRESSURE: usize = 10;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    pressure: usize,
    /// Insertion order, for tie-breaking.
    seq: u64,
}

#[derive(Debug)]
struct State<K, V> {
    entries: FxHashMap<K, Entry<V>>,
    total: usize,
    next_seq: u64,
}

/// Bounded map with write-weighted eviction. All operations take one lock.
#[derive(Debug)]
pub struct PressureCache<K, V> {
    max_pressure: usize,
    overpressure: usize,
    state: Mutex<State<K, V>>,
}

impl<K, V> PressureCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(max_pressure: usize) -> Self {
        Self::with_overpressure(max_pressure, DEFAULT_OVERPRESSURE)
    }

    pub fn with_overpressure(max_pressure: usize, overpressure: usize) -> Self {
        Self {
            max_pressure,
            overpressure,
            state: Mutex::new(State {
                entries: FxHashMap::default(),
                total: 0,
                next_seq: 0,
            }),
        }
    }

    #[inline]
    pub const fn max_pressure(&self) -> usize {
        self.max_pressure
    }

    #[inline]
    pub const fn overpressure(&self) -> usize {
        self.overpressure
    }

    /// Stored value, if any. Never affects eviction.
    pub fn get(&self, key: &K) -> Option<V> {
        self.state.lock().entries.get(key).map(|e| e.value.clone())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Store `value` and add one unit of pressure to `key`.
    pub fn set(&self, key: K, value: V) {
        let mut state = self.state.lock();

        if !state.entries.contains_key(&key)
            && state.total >= self.max_pressure + self.overpressure
        {
            self.compact(&mut state);
        }

        match state.entries.get_mut(&key) {
            Some(entry) => {
                entry.value = value;
                entry.pressure += 1;
            }
            None => {
                let seq = state.next_seq;
                state.next_seq += 1;
                state.entries.insert(
                    key,
                    Entry {
                        value,
                        pressure: 1,
                        seq,
                    },
                );
            }
        }
        state.total += 1;
    }

    fn compact(&self, state: &mut State<K, V>) {
        let before = state.entries.len();
        let total = state.total;
        if total == 0 {
            return;
        }

        for entry in state.entries.values_mut() {
            entry.pressure = (entry.pressure * self.max_pressure).div_ceil(total);
        }
        state.entries.retain(|_, entry| entry.pressure > 0);
        state.total = state.entries.values().map(|e| e.pressure).sum();

        if state.total >= self.max_pressure {
            let coldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.pressure, entry.seq))
                .map(|(key, _)| key.clone());
            if let Some(key) = coldest
                && let Some(entry) = state.entries.remove(&key)
            {
                state.total -= entry.pressure;
            }
        }

        crate::debug!(
            "cache";
            "compacted {} -> {} entries (pressure {} -> {})",
            before,
            state.entries.len(),
            total,
            state.total
        );
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Total pressure.
    pub fn pressure(&self) -> usize {
        self.state.lock().total
    }

    pub fn entry_pressure(&self, key: &K) -> Option<usize> {
        self.state.lock().entries.get(key).map(|e| e.pressure)
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.total = 0;
    }
}
