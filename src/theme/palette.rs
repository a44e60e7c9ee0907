//! Categorical colour palettes.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::models::Rgb;

/// Category10 colours used when a key has no explicit entry.
const CATEGORICAL: [Rgb; 10] = [
    Rgb(0x1F77B4),
    Rgb(0xFF7F0E),
    Rgb(0x2CA02C),
    Rgb(0xD62728),
    Rgb(0x9467BD),
    Rgb(0x8C564B),
    Rgb(0xE377C2),
    Rgb(0x7F7F7F),
    Rgb(0xBCBD22),
    Rgb(0x17BECF),
];

/// Maps a categorical key to a colour.
///
/// Explicit entries win; any other non-empty key is hashed onto the
/// categorical list so the same key always gets the same colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: BTreeMap<String, Rgb>,
    categorical: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            categorical: CATEGORICAL.to_vec(),
        }
    }
}

impl Palette {
    /// A palette with only explicit entries; unknown keys resolve to `None`.
    pub fn fixed(entries: BTreeMap<String, Rgb>) -> Self {
        Self {
            entries,
            categorical: Vec::new(),
        }
    }

    /// Builder: add or replace an explicit entry.
    pub fn with_entry(mut self, key: impl Into<String>, color: Rgb) -> Self {
        self.entries.insert(key.into(), color);
        self
    }

    /// Builder: add several explicit entries.
    pub fn with_entries<'a>(mut self, entries: impl IntoIterator<Item = (&'a String, &'a Rgb)>) -> Self {
        for (key, color) in entries {
            self.entries.insert(key.clone(), *color);
        }
        self
    }

    /// Resolve a key to a colour.
    pub fn get(&self, key: &str) -> Option<Rgb> {
        if key.is_empty() {
            return None;
        }
        if let Some(color) = self.entries.get(key) {
            return Some(*color);
        }
        if self.categorical.is_empty() {
            return None;
        }
        let idx = (stable_hash(key, 0) % self.categorical.len() as u64) as usize;
        Some(self.categorical[idx])
    }
}

/// Deterministic hash of a key. Stable across runs and platforms.
pub(crate) fn stable_hash(key: &str, salt: u64) -> u64 {
    let mut hasher = FxHasher::default();
    salt.hash(&mut hasher);
    key.hash(&mut hasher);
    // Fx mixes poorly in the low bits for short keys; fold the high half in.
    let h = hasher.finish();
    h ^ (h >> 29)
}

/// Deterministic value in [-1, 1] derived from a key.
pub(crate) fn stable_signed_unit(key: &str, salt: u64) -> f64 {
    let bits = stable_hash(key, salt) >> 11;
    (bits as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_entry_wins() {
        let palette = Palette::default().with_entry("Fintech", Rgb(0x123456));
        assert_eq!(palette.get("Fintech"), Some(Rgb(0x123456)));
    }

    #[test]
    fn test_hashed_key_is_stable() {
        let palette = Palette::default();
        let first = palette.get("Robotics");
        assert!(first.is_some());
        assert_eq!(first, palette.get("Robotics"));
        assert!(CATEGORICAL.contains(&first.unwrap()));
    }

    #[test]
    fn test_fixed_palette_misses() {
        let palette = Palette::fixed(BTreeMap::new());
        assert_eq!(palette.get("anything"), None);
        assert_eq!(Palette::default().get(""), None);
    }

    #[test]
    fn test_signed_unit_range() {
        for key in ["a", "b", "acme", "globex", "initech"] {
            let v = stable_signed_unit(key, 3);
            assert!((-1.0..=1.0).contains(&v));
        }
    }
}
